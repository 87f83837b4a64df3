//! Terminal input events delivered to view components

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Keyboard event
    Key(KeyEvent),
    /// Pasted text, delivered whole
    Paste(String),
    /// Terminal resize, new (columns, rows)
    Resize(u16, u16),
}

impl EventKind {
    /// Ctrl+C / Ctrl+Q, which always leave the tester
    pub fn is_quit(&self) -> bool {
        match self {
            EventKind::Key(key) => {
                key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            }
            _ => false,
        }
    }
}
