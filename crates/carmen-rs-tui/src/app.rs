//! Application state for the Carmen TUI.

use crate::ui::Palette;
use carmen_rs_core::{
    ChatController, CommandEffect, ControllerState, MoodInfo, SHUTDOWN_GRACE, Submission,
    TurnOutcome,
};
use carmen_rs_memory::TurnRole;
use log::{debug, info};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::cmp::min;
use std::time::Instant;

/// Viewer overlay types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    Moods,
}

/// Top-level application state for the TUI.
pub struct App {
    /// Session logic; owns the transcript.
    pub controller: ChatController,
    /// Current input buffer.
    pub input: String,
    /// Whether to show the slash command palette.
    pub show_slash_commands: bool,
    /// Status line text.
    pub status: String,
    /// Current viewer mode, if any.
    pub viewer: Option<ViewerKind>,
    /// Index of the highlighted mood in the mood viewer.
    pub selected_mood: usize,
    /// Current scroll offset.
    pub scroll: u16,
    /// Whether to auto-scroll to the bottom.
    pub auto_scroll: bool,
    /// Maximum scroll offset for the chat view.
    pub chat_max_scroll: u16,
    /// When the farewell grace period ends.
    closing_deadline: Option<Instant>,
}

impl App {
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            input: String::new(),
            show_slash_commands: false,
            status: "idle".to_string(),
            viewer: None,
            selected_mood: 0,
            scroll: 0,
            auto_scroll: true,
            chat_max_scroll: 0,
            closing_deadline: None,
        }
    }

    /// Set the status line.
    pub fn push_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Send the input buffer to the controller.
    pub fn submit_input(&mut self) {
        let input = std::mem::take(&mut self.input);
        self.show_slash_commands = false;
        self.submit(&input);
    }

    /// Submit a line on the user's behalf and reflect the result.
    pub fn submit(&mut self, input: &str) {
        match self.controller.submit(input) {
            Submission::Ignored => {}
            Submission::Dispatched => {
                self.push_status("thinking");
                self.enable_auto_scroll();
            }
            Submission::Queued(pending) => {
                self.push_status(format!("thinking ({pending} queued)"));
                self.enable_auto_scroll();
            }
            Submission::Command(effect) => {
                debug!("command applied (effect={:?})", effect);
                if effect == CommandEffect::Quit {
                    self.begin_closing();
                }
                self.maybe_enable_auto_scroll();
            }
        }
    }

    /// Apply a finished model call.
    pub fn apply_outcome(&mut self, outcome: TurnOutcome) {
        if self.controller.complete(outcome).is_none() {
            return;
        }
        let pending = self.controller.pending().count();
        match self.controller.state() {
            ControllerState::AwaitingResponse if pending > 0 => {
                self.push_status(format!("thinking ({pending} queued)"));
            }
            ControllerState::AwaitingResponse => self.push_status("thinking"),
            _ => self.push_status("idle"),
        }
        self.maybe_enable_auto_scroll();
    }

    /// Say goodbye and start the grace period.
    pub fn begin_closing(&mut self) {
        self.controller.shutdown();
        if self.closing_deadline.is_none() {
            info!("closing (grace_ms={})", SHUTDOWN_GRACE.as_millis());
            self.closing_deadline = Some(Instant::now() + SHUTDOWN_GRACE);
        }
        self.push_status("closing");
        self.close_viewer();
        self.show_slash_commands = false;
        self.enable_auto_scroll();
    }

    pub fn is_closing(&self) -> bool {
        self.closing_deadline.is_some()
    }

    /// Terminate once the grace period has passed; returns true when done.
    pub fn finish_closing_if_due(&mut self, now: Instant) -> bool {
        match self.closing_deadline {
            Some(deadline) if now >= deadline => {
                self.controller.terminate();
                true
            }
            _ => false,
        }
    }

    /// Open the mood viewer with the current mood highlighted.
    pub fn open_viewer(&mut self, kind: ViewerKind) {
        let current = self.controller.current_mood().name();
        self.selected_mood = self
            .controller
            .context()
            .moods
            .iter()
            .position(|info| info.name() == current)
            .unwrap_or(0);
        self.viewer = Some(kind);
    }

    /// Close the viewer overlay.
    pub fn close_viewer(&mut self) {
        self.viewer = None;
    }

    pub fn select_previous_mood(&mut self) {
        self.selected_mood = self.selected_mood.saturating_sub(1);
    }

    pub fn select_next_mood(&mut self) {
        let count = self.controller.context().moods.iter().count();
        if self.selected_mood + 1 < count {
            self.selected_mood += 1;
        }
    }

    /// Switch to the highlighted mood.
    pub fn activate_selected_mood(&mut self) {
        let selected: Option<&'static MoodInfo> =
            self.controller.context().moods.iter().nth(self.selected_mood);
        if let Some(info) = selected {
            self.submit(&format!("/mood {}", info.name()));
        }
        self.close_viewer();
    }

    /// Scroll the chat view upward by a number of lines.
    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scroll the chat view downward by a number of lines.
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = min(self.scroll.saturating_add(lines), self.chat_max_scroll);
        if self.scroll >= self.chat_max_scroll {
            self.auto_scroll = true;
        }
    }

    /// Scroll to the top of the chat view.
    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll = 0;
    }

    /// Enable auto-scrolling to the bottom.
    pub fn enable_auto_scroll(&mut self) {
        self.auto_scroll = true;
        self.scroll = self.chat_max_scroll;
    }

    /// Update scroll bounds after layout changes, staying pinned to the
    /// bottom only when already there.
    pub fn update_scroll_bounds(&mut self, max_scroll: u16) {
        let was_at_bottom = self.scroll >= self.chat_max_scroll;
        self.chat_max_scroll = max_scroll;
        if self.auto_scroll || was_at_bottom {
            self.scroll = max_scroll;
            self.auto_scroll = true;
        } else {
            self.scroll = self.scroll.min(max_scroll);
        }
    }

    fn maybe_enable_auto_scroll(&mut self) {
        if self.auto_scroll {
            self.scroll = self.chat_max_scroll;
        }
    }

    /// Render the transcript and queued messages into styled lines.
    pub fn render_lines(&self, palette: &Palette) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let turns = self.controller.turns();
        let pending: Vec<&str> = self.controller.pending().collect();

        if turns.is_empty() && pending.is_empty() {
            lines.push(Line::from(Span::styled(
                " Say something to begin.",
                Style::default().fg(palette.muted),
            )));
            return lines;
        }

        let config = &self.controller.context().config;
        let companion_badge = format!(" {} {} ", config.name, config.emoji);
        let badge = |background: Color| {
            Style::default()
                .fg(palette.badge_text)
                .bg(background)
                .add_modifier(Modifier::BOLD)
        };

        for turn in turns {
            let (label, label_style, content_style) = match turn.role {
                TurnRole::User => (
                    " you ".to_string(),
                    badge(palette.user),
                    Style::default().fg(palette.text),
                ),
                TurnRole::Assistant => (
                    companion_badge.clone(),
                    badge(palette.accent),
                    Style::default().fg(palette.text),
                ),
                TurnRole::System => (
                    " notice ".to_string(),
                    badge(palette.border),
                    Style::default().fg(palette.muted),
                ),
            };
            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::styled(
                    format!(" {}", turn.timestamp.format("%H:%M")),
                    Style::default().fg(palette.muted),
                ),
            ]));
            push_content(&mut lines, &turn.text, content_style);
            lines.push(Line::from(Span::raw("")));
        }

        for text in pending {
            lines.push(Line::from(vec![
                Span::styled(" you ", badge(palette.border)),
                Span::styled(" queued", Style::default().fg(palette.muted)),
            ]));
            push_content(
                &mut lines,
                text,
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC),
            );
            lines.push(Line::from(Span::raw("")));
        }

        if self.controller.state() == ControllerState::AwaitingResponse {
            lines.push(Line::from(Span::styled(
                format!(" {} is thinking...", config.name),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }
}

fn push_content(lines: &mut Vec<Line<'static>>, text: &str, style: Style) {
    for line in text.lines() {
        lines.push(Line::from(Span::styled(format!(" {line}"), style)));
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::ui::palette;
    use carmen_rs_config::Theme;
    use carmen_rs_core::NoopSpeech;
    use carmen_rs_test_utils::{FixedModel, GatedModel, TestContext};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn line_text(line: &ratatui::text::Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[tokio::test]
    async fn queued_messages_render_after_transcript() {
        let test = TestContext::new();
        let model = GatedModel::new();
        let (controller, _outcomes) = test.controller(Arc::new(model), Arc::new(NoopSpeech));
        let mut app = App::new(controller);
        app.submit("first");
        app.submit("second");
        assert_eq!(app.status, "thinking (1 queued)");

        let lines: Vec<String> = app
            .render_lines(&palette(Theme::Dark))
            .iter()
            .map(line_text)
            .collect();
        let first = lines.iter().position(|line| line == " first").expect("first");
        let second = lines.iter().position(|line| line == " second").expect("second");
        assert!(first < second);
        assert!(lines.contains(&" you  queued".to_string()));
        assert_eq!(lines.last().expect("thinking"), " Carmen is thinking...");
    }

    #[tokio::test]
    async fn quit_waits_for_grace_period() {
        let test = TestContext::new();
        let (controller, _outcomes) =
            test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
        let mut app = App::new(controller);
        app.input = "/quit".to_string();
        app.submit_input();
        assert!(app.is_closing());
        assert_eq!(app.status, "closing");
        assert!(!app.finish_closing_if_due(Instant::now()));
        assert!(app.finish_closing_if_due(Instant::now() + Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn scroll_stays_put_when_user_scrolled_up() {
        let test = TestContext::new();
        let (controller, _outcomes) =
            test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
        let mut app = App::new(controller);
        app.update_scroll_bounds(10);
        assert_eq!(app.scroll, 10);
        app.scroll_up(4);
        app.update_scroll_bounds(12);
        assert_eq!(app.scroll, 6);
        app.scroll_down(100);
        assert_eq!(app.scroll, 12);
        assert!(app.auto_scroll);
    }

    #[tokio::test]
    async fn mood_viewer_switches_mood() {
        let test = TestContext::new();
        let (controller, _outcomes) =
            test.controller(Arc::new(FixedModel::new("ok")), Arc::new(NoopSpeech));
        let mut app = App::new(controller);
        app.open_viewer(super::ViewerKind::Moods);
        assert_eq!(app.selected_mood, 0);
        app.select_next_mood();
        app.select_next_mood();
        app.activate_selected_mood();
        assert_eq!(app.viewer, None);
        assert_eq!(app.controller.current_mood().name(), "Intellectual");
    }
}
