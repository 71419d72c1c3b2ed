//! Library entry point for the Carmen TUI.
//!
//! Provides a reusable [`run`] function that launches the Ratatui chat window
//! against a ready [`ChatController`].

mod app;
mod event;
mod ui;

use anyhow::anyhow;
use app::{App, ViewerKind};
use carmen_rs_core::{ChatController, TurnOutcome};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use log::{debug, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Launch the chat window.
///
/// The caller is responsible for initializing logging before calling `run`;
/// anything written to the terminal while the UI is up corrupts the screen.
///
/// # Errors
/// Returns an error if terminal setup or the event loop fails.
pub async fn run(
    controller: ChatController,
    mut outcomes: mpsc::Receiver<TurnOutcome>,
) -> anyhow::Result<()> {
    let mut app = App::new(controller);
    app.controller.start();

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::channel(256);
    spawn_input_handler(tx.clone());
    spawn_tick(tx);

    let result = async {
        loop {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
            tokio::select! {
                event = rx.recv() => {
                    let event = event.ok_or_else(|| anyhow!("event channel closed unexpectedly"))?;
                    if handle_app_event(event, &mut app) {
                        break;
                    }
                }
                Some(outcome) = outcomes.recv() => app.apply_outcome(outcome),
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    restore_terminal(&mut terminal)?;
    info!("chat window closed");
    result
}

/// Dispatch a UI event and return true when the app should exit.
fn handle_app_event(event: AppEvent, app: &mut App) -> bool {
    match event {
        AppEvent::Input(key) => handle_input(key, app),
        AppEvent::Scroll(delta) => {
            if app.viewer.is_some() {
                return false;
            }
            if delta < 0 {
                app.scroll_up((-delta) as u16);
            } else if delta > 0 {
                app.scroll_down(delta as u16);
            }
            false
        }
        AppEvent::Tick => app.finish_closing_if_due(Instant::now()),
    }
}

/// Handle keyboard input while the mood viewer is open.
fn handle_viewer_input(key: KeyEvent, kind: ViewerKind, app: &mut App) {
    match (kind, key.code) {
        (ViewerKind::Moods, KeyCode::Up) => app.select_previous_mood(),
        (ViewerKind::Moods, KeyCode::Down) => app.select_next_mood(),
        (ViewerKind::Moods, KeyCode::Enter) => app.activate_selected_mood(),
        _ => {}
    }
}

/// Handle keyboard input in the default (non-viewer) state.
fn handle_default_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.show_slash_commands = false;
            app.open_viewer(ViewerKind::Moods);
        }
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.submit("/theme");
        }
        KeyCode::PageUp => app.scroll_up(5),
        KeyCode::PageDown => app.scroll_down(5),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.enable_auto_scroll(),
        KeyCode::Enter => {
            if app.input.trim().is_empty() {
                app.show_slash_commands = false;
                return;
            }
            app.submit_input();
        }
        KeyCode::Backspace => {
            app.input.pop();
            app.show_slash_commands = app.input.trim_start().starts_with('/');
        }
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                app.input.push(ch);
                app.show_slash_commands = app.input.trim_start().starts_with('/');
            }
        }
        _ => {}
    }
}

/// Handle keyboard input and return true when the app should exit now.
fn handle_input(key: KeyEvent, app: &mut App) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        // A second Ctrl+C skips the farewell grace period.
        if app.is_closing() {
            return app.finish_closing_if_due(Instant::now() + carmen_rs_core::SHUTDOWN_GRACE);
        }
        app.begin_closing();
        return false;
    }
    if key.code == KeyCode::Esc {
        if app.viewer.is_some() {
            app.close_viewer();
            return false;
        }
        if app.show_slash_commands {
            app.show_slash_commands = false;
            app.input.clear();
            return false;
        }
        app.begin_closing();
        return false;
    }
    if app.is_closing() {
        return false;
    }

    if let Some(kind) = app.viewer {
        handle_viewer_input(key, kind, app);
        return false;
    }

    handle_default_input(key, app);
    false
}

/// Spawn a task to poll for input events.
fn spawn_input_handler(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        const MOUSE_SCROLL_LINES: i16 = 3;
        loop {
            if matches!(crossterm::event::poll(Duration::from_millis(30)), Ok(true)) {
                while matches!(crossterm::event::poll(Duration::from_millis(0)), Ok(true)) {
                    let event = match crossterm::event::read() {
                        Ok(event) => event,
                        Err(_) => break,
                    };
                    let lines = |modifiers: KeyModifiers| {
                        if modifiers.contains(KeyModifiers::SHIFT) {
                            MOUSE_SCROLL_LINES.saturating_mul(2)
                        } else {
                            MOUSE_SCROLL_LINES
                        }
                    };
                    let sent = match event {
                        CrosstermEvent::Key(key) => sender.send(AppEvent::Input(key)).await,
                        CrosstermEvent::Mouse(mouse) => match mouse.kind {
                            MouseEventKind::ScrollUp => {
                                sender.send(AppEvent::Scroll(-lines(mouse.modifiers))).await
                            }
                            MouseEventKind::ScrollDown => {
                                sender.send(AppEvent::Scroll(lines(mouse.modifiers))).await
                            }
                            _ => Ok(()),
                        },
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    });
}

/// Spawn a periodic tick event generator.
fn spawn_tick(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if sender.send(AppEvent::Tick).await.is_err() {
                return;
            }
        }
    });
}

/// Configure terminal in raw mode with alternate screen.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    debug!("setting up terminal");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal state on exit.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    debug!("restoring terminal");
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
