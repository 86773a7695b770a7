//! Navigation input.

use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// One navigation event per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// Move the selection up.
    Up,
    /// Move the selection down.
    Down,
    /// Leave the program.
    Quit,
    /// Timeout or an unmapped key.
    None,
}

/// Maps keys to navigation events.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Enable `j`/`k`.
    pub vim_keys: bool,
}

impl InputHandler {
    /// Creates a new input handler.
    #[must_use]
    pub fn new(vim_keys: bool) -> Self {
        Self { vim_keys }
    }

    /// Handles a key event and returns the corresponding navigation event.
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> NavEvent {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return NavEvent::Quit;
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => NavEvent::Quit,
            KeyCode::Up => NavEvent::Up,
            KeyCode::Down => NavEvent::Down,
            KeyCode::Char('k') if self.vim_keys => NavEvent::Up,
            KeyCode::Char('j') if self.vim_keys => NavEvent::Down,
            _ => NavEvent::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Source of navigation events.
pub trait EventSource {
    /// Waits up to `timeout` for one event.
    ///
    /// The wait is the sample interval, so an implementation should block for
    /// the whole timeout when no key arrives.
    fn next_event(&mut self, timeout: Duration) -> Result<NavEvent>;
}

/// Keyboard events from the controlling terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalEvents {
    handler: InputHandler,
}

impl TerminalEvents {
    /// Creates a terminal event source.
    #[must_use]
    pub fn new(handler: InputHandler) -> Self {
        Self { handler }
    }
}

impl EventSource for TerminalEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<NavEvent> {
        if !event::poll(timeout)? {
            return Ok(NavEvent::None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.handler.handle_key(key)),
            _ => Ok(NavEvent::None),
        }
    }
}
