//! Rendering routines for the Carmen TUI.

use crate::app::{App, ViewerKind};
use carmen_rs_config::Theme;
use carmen_rs_core::controller::HELP_LINES;
use carmen_rs_core::{Decoration, MoodInfo};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};

const HEADER_HEIGHT: u16 = 7;
const MOOD_PANEL_WIDTH: u16 = 30;
const SLASH_PALETTE_WIDTH: u16 = 56;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub user: Color,
    pub badge_text: Color,
    pub overlay: Color,
}

/// Palette for a theme.
pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: Color::Rgb(30, 30, 30),
            text: Color::Rgb(238, 238, 238),
            muted: Color::Rgb(128, 128, 128),
            border: Color::Rgb(60, 60, 60),
            accent: Color::Rgb(0, 255, 204),
            user: Color::Rgb(107, 161, 230),
            badge_text: Color::Rgb(10, 10, 10),
            overlay: Color::Rgb(20, 20, 20),
        },
        Theme::Light => Palette {
            background: Color::Rgb(240, 240, 240),
            text: Color::Rgb(20, 20, 20),
            muted: Color::Rgb(110, 110, 110),
            border: Color::Rgb(190, 190, 190),
            accent: Color::Rgb(168, 50, 120),
            user: Color::Rgb(40, 100, 190),
            badge_text: Color::Rgb(250, 250, 250),
            overlay: Color::Rgb(225, 225, 225),
        },
        Theme::Blue => Palette {
            background: Color::Rgb(10, 25, 47),
            text: Color::Rgb(204, 214, 246),
            muted: Color::Rgb(136, 146, 176),
            border: Color::Rgb(35, 53, 84),
            accent: Color::Rgb(100, 255, 218),
            user: Color::Rgb(130, 170, 255),
            badge_text: Color::Rgb(10, 25, 47),
            overlay: Color::Rgb(17, 34, 64),
        },
    }
}

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let palette = palette(app.controller.theme());
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background)),
        area,
    );

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // header bar
            Constraint::Min(0),                // chat or viewer
            Constraint::Length(3),             // input / footer
            Constraint::Length(1),             // status bar
        ])
        .split(area);

    draw_header(frame, app, &palette, root[0]);
    if app.viewer.is_some() {
        draw_viewer(frame, app, &palette, root[1]);
        draw_viewer_footer(frame, &palette, root[2]);
    } else {
        draw_chat(frame, app, &palette, root[1]);
        if app.show_slash_commands {
            draw_slash_palette(frame, &palette, root[1]);
        }
        draw_input(frame, app, &palette, root[2]);
    }
    draw_status_bar(frame, app, &palette, root[3]);
}

/// Draw the companion banner on the left and the mood panel on the right.
fn draw_header(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let context = app.controller.context();
    let config = &context.config;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(MOOD_PANEL_WIDTH)])
        .split(area);

    let left_block = Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::BOTTOM)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border));
    let inner = left_block.inner(cols[0]);
    frame.render_widget(left_block, cols[0]);

    let label_style = Style::default().fg(palette.muted);
    let value_style = Style::default().fg(palette.text);
    let speech = if context.speech.is_enabled() { "on" } else { "off" };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} {}", config.name, config.emoji),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(palette.muted),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" model ", label_style),
            Span::styled(context.model.describe(), value_style),
            Span::styled("  temperature ", label_style),
            Span::styled(format!("{:.1}", config.temperature), value_style),
        ]),
        Line::from(vec![
            Span::styled(" theme ", label_style),
            Span::styled(config.theme.as_str(), value_style),
            Span::styled("  speech ", label_style),
            Span::styled(speech, value_style),
            Span::styled("  data ", label_style),
            Span::styled(context.dirs.root().display().to_string(), value_style),
        ]),
    ];
    let pad_top = inner.height.saturating_sub(lines.len() as u16) / 2;
    let centered = Rect {
        y: inner.y + pad_top,
        height: inner.height.saturating_sub(pad_top),
        ..inner
    };
    frame.render_widget(Paragraph::new(lines), centered);

    draw_mood_panel(frame, app, palette, cols[1]);
}

/// Current mood with the avatar and ambient loop it would use.
fn draw_mood_panel(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let mood = app.controller.current_mood();
    let (avatar, ambient) = app.controller.mood_assets();
    let block = Block::default()
        .borders(Borders::TOP | Borders::RIGHT | Borders::BOTTOM)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" Mood ", Style::default().fg(palette.muted)));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let file_name = |path: Option<std::path::PathBuf>, missing: &str| {
        path.and_then(|path| path.file_name().map(|name| name.to_string_lossy().to_string()))
            .unwrap_or_else(|| missing.to_string())
    };
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} {}", mood.emoji, mood.name()),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" avatar  {}", file_name(avatar, "none")),
            Style::default().fg(palette.muted),
        )),
        Line::from(Span::styled(
            format!(" ambient {}", file_name(ambient, "silence")),
            Style::default().fg(palette.muted),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Draw the chat transcript with border and scrollbar.
fn draw_chat(frame: &mut Frame<'_>, app: &mut App, palette: &Palette, area: Rect) {
    let lines = app.render_lines(palette);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" Chat ", Style::default().fg(palette.muted)));

    let inner = block.inner(area);
    let content_width = inner.width.saturating_sub(1);
    let content_height = inner.height as usize;

    let total_lines = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(content_width)
        .max(1);
    let max_scroll = total_lines.saturating_sub(content_height) as u16;
    app.update_scroll_bounds(max_scroll);
    let scroll = app.scroll;

    let chat_inner = Rect {
        width: inner.width.saturating_sub(1),
        ..inner
    };
    let chat = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(block, area);
    frame.render_widget(chat, chat_inner);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(total_lines)
            .position(scroll as usize)
            .viewport_content_length(content_height);
        let scrollbar_area = Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: inner.y,
            width: 1,
            height: inner.height,
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(palette.border))
                .thumb_style(Style::default().fg(palette.muted)),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

/// Draw the input box with border and cursor.
fn draw_input(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let is_active = !app.is_closing();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if is_active {
            palette.accent
        } else {
            palette.border
        }))
        .title(Span::styled(" Message ", Style::default().fg(palette.muted)));
    let inner = block.inner(area);

    let prompt_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let input_text = if app.input.is_empty() && is_active {
        Line::from(vec![
            Span::styled(" ", prompt_style),
            Span::styled(
                "Type a message, or / for commands...",
                Style::default().fg(palette.muted),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(" ", prompt_style),
            Span::styled(app.input.as_str(), Style::default().fg(palette.text)),
        ])
    };

    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(input_text), inner);

    if is_active {
        let offset = app.input.chars().count() as u16;
        frame.set_cursor_position((inner.x + 1 + offset, inner.y));
    }
}

/// Draw the status bar at the bottom.
fn draw_status_bar(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let status_color = match app.status.as_str() {
        "idle" => palette.muted,
        _ => palette.accent,
    };
    let key = Style::default().fg(palette.muted);
    let hint = Style::default().fg(palette.border);
    let shortcuts = vec![
        Span::styled(" Ctrl+C", key),
        Span::styled(" quit", hint),
        Span::styled("  Ctrl+O", key),
        Span::styled(" moods", hint),
        Span::styled("  Ctrl+T", key),
        Span::styled(" theme", hint),
        Span::styled("  /", key),
        Span::styled(" commands", hint),
        Span::styled("  PgUp/PgDn", key),
        Span::styled(" scroll", hint),
    ];

    let right_text = format!(" {} ", app.status);
    let right_len = right_text.chars().count() as u16;
    let left_area = Rect {
        width: area.width.saturating_sub(right_len),
        ..area
    };
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        width: right_len,
        ..area
    };
    frame.render_widget(Paragraph::new(Line::from(shortcuts)), left_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(status_color),
        ))),
        right_area,
    );
}

fn draw_slash_palette(frame: &mut Frame<'_>, palette: &Palette, area: Rect) {
    let command_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let about_style = Style::default().fg(palette.muted);
    let width = HELP_LINES
        .iter()
        .map(|(usage, _)| usage.len())
        .max()
        .unwrap_or_default()
        + 2;

    let mut lines: Vec<Line<'_>> = HELP_LINES
        .iter()
        .map(|(usage, about)| {
            Line::from(vec![
                Span::styled(format!("  {usage:<width$}"), command_style),
                Span::styled(*about, about_style),
            ])
        })
        .collect();
    lines.push(Line::from(vec![]));
    lines.push(Line::from(Span::styled(
        "  Esc to close",
        about_style.add_modifier(Modifier::ITALIC),
    )));

    let height = (lines.len() as u16 + 2).min(area.height);
    let palette_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(height),
        width: area.width.saturating_sub(2).min(SLASH_PALETTE_WIDTH),
        height,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.accent))
        .title(Span::styled(" Commands ", command_style))
        .style(Style::default().bg(palette.overlay));
    frame.render_widget(Paragraph::new(lines).block(block), palette_area);
}

fn draw_viewer(frame: &mut Frame<'_>, app: &App, palette: &Palette, area: Rect) {
    let Some(kind) = app.viewer else {
        return;
    };
    let (title, lines) = match kind {
        ViewerKind::Moods => (" Moods ", render_mood_lines(app, palette)),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn draw_viewer_footer(frame: &mut Frame<'_>, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" Actions ", Style::default().fg(palette.muted)));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        " Up/Down to navigate  Enter to select  Esc to close",
        Style::default().fg(palette.muted),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn describe_decoration(info: &MoodInfo) -> String {
    match info.decoration {
        Decoration::Prefix(prefix) => format!("opens with \"{}\"", prefix.trim_end()),
        Decoration::Suffix(suffix) => format!("ends with \"{}\"", suffix.trim_start()),
    }
}

fn render_mood_lines(app: &App, palette: &Palette) -> Vec<Line<'static>> {
    let current = app.controller.current_mood().name();
    let mut lines = Vec::new();
    for (index, info) in app.controller.context().moods.iter().enumerate() {
        let is_selected = index == app.selected_mood;
        let style = if is_selected {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        let marker = if is_selected { ">" } else { " " };
        let active = if info.name() == current { " (active)" } else { "" };
        let rate = info
            .speech_rate
            .map(|rate| format!("{rate} wpm"))
            .unwrap_or_else(|| "default pace".to_string());
        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} {} {:<13}", info.emoji, info.name()), style),
            Span::styled(active, Style::default().fg(palette.accent)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("     {}, {rate}", describe_decoration(info)),
            Style::default().fg(palette.muted),
        )));
    }
    lines
}
