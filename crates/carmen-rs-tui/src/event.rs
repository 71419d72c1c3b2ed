//! TUI event types for input and timers.

use crossterm::event::KeyEvent;

/// Application event emitted by the input handler or the ticker.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Periodic tick event.
    Tick,
    /// Scroll event in the chat view.
    Scroll(i16),
}
