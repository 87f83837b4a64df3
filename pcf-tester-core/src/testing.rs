//! Test utilities for controls and views
//!
//! - [`key`] / [`typed`]: build key events from strings
//! - [`RecordingHost`]: a [`Host`] that records every callback
//! - [`RenderHarness`]: render components into an in-memory buffer
//! - Assertion macros for effect and message lists
//!
//! # Example
//!
//! ```ignore
//! use pcf_tester::testing::{RecordingHost, RenderHarness};
//!
//! let mut host = RecordingHost::default();
//! control.on_command("event", &mut host)?;
//! assert_eq!(host.calls, vec![HostCall::OnAction]);
//! ```

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::{Frame, Terminal};

use crate::event::EventKind;
use crate::host::{ControlState, Host, HostCall, HostContext};

/// Create a `KeyEvent` from a key string such as `"enter"` or `"ctrl+u"`.
///
/// # Examples
///
/// ```
/// use pcf_tester_core::testing::key;
/// use crossterm::event::{KeyCode, KeyModifiers};
///
/// let k = key("ctrl+u");
/// assert_eq!(k.code, KeyCode::Char('u'));
/// assert!(k.modifiers.contains(KeyModifiers::CONTROL));
/// ```
///
/// # Panics
///
/// Panics if the key string cannot be parsed.
pub fn key(s: &str) -> KeyEvent {
    parse_key(s).unwrap_or_else(|| panic!("Invalid key string: {:?}", s))
}

fn parse_key(s: &str) -> Option<KeyEvent> {
    let parts: Vec<&str> = s.trim().split('+').collect();
    let (key_part, modifier_parts) = parts.split_last()?;

    let mut modifiers = KeyModifiers::empty();
    for part in modifier_parts {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => return None,
        }
    }

    let code = match key_part.to_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        _ => {
            let mut chars = key_part.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    };

    Some(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    })
}

/// Create a `KeyEvent` for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Wrap a key string as an [`EventKind`].
pub fn key_event(s: &str) -> EventKind {
    EventKind::Key(key(s))
}

/// One key event per character of `text`, as if typed.
pub fn typed(text: &str) -> Vec<EventKind> {
    text.chars().map(|c| EventKind::Key(char_key(c))).collect()
}

/// A [`Host`] that records every callback instead of acting on it.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub context: HostContext,
    pub calls: Vec<HostCall>,
    /// Last state pushed through `set_control_state`
    pub control_state: Option<ControlState>,
}

impl RecordingHost {
    pub fn new(context: HostContext) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    /// Take the recorded calls, leaving the list empty.
    pub fn drain_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of recorded calls equal to `call`.
    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl Host for RecordingHost {
    fn context(&self) -> &HostContext {
        &self.context
    }

    fn on_action(&mut self) {
        self.calls.push(HostCall::OnAction);
    }

    fn notify_output_changed(&mut self) {
        self.calls.push(HostCall::NotifyOutputChanged);
    }

    fn track_container_resize(&mut self, enabled: bool) {
        self.calls.push(HostCall::TrackContainerResize(enabled));
    }

    fn set_control_state(&mut self, state: ControlState) {
        self.control_state = Some(state.clone());
        self.calls.push(HostCall::SetControlState(state));
    }

    fn set_selected_record_ids(&mut self, ids: Vec<String>) {
        self.calls.push(HostCall::SetSelectedRecordIds(ids));
    }

    fn set_page_size(&mut self, size: u32) {
        self.calls.push(HostCall::SetPageSize(size));
    }

    fn load_next_page(&mut self) {
        self.calls.push(HostCall::LoadNextPage);
    }

    fn load_previous_page(&mut self) {
        self.calls.push(HostCall::LoadPreviousPage);
    }

    fn load_exact_page(&mut self, page: u32) {
        self.calls.push(HostCall::LoadExactPage(page));
    }

    fn refresh_dataset(&mut self) {
        self.calls.push(HostCall::RefreshDataset);
    }
}

/// Renders into a [`TestBackend`] so views can be asserted as text.
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    /// # Panics
    ///
    /// Panics if the test terminal cannot be created.
    pub fn new(width: u16, height: u16) -> Self {
        let terminal =
            Terminal::new(TestBackend::new(width, height)).expect("test terminal creation");
        Self { terminal }
    }

    /// Draw one frame and return the buffer.
    ///
    /// # Panics
    ///
    /// Panics if drawing fails.
    pub fn render<F>(&mut self, draw: F) -> &Buffer
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(draw).expect("test terminal draw");
        self.terminal.backend().buffer()
    }

    /// Draw one frame and return its text, one line per row.
    pub fn render_to_string_plain<F>(&mut self, draw: F) -> String
    where
        F: FnOnce(&mut Frame),
    {
        buffer_to_string_plain(self.render(draw))
    }
}

/// Buffer contents as text, trailing spaces trimmed from each row.
pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut lines = Vec::with_capacity(area.height as usize);
    for y in area.y..area.y + area.height {
        let mut line = String::new();
        for x in area.x..area.x + area.width {
            line.push_str(buffer[(x, y)].symbol());
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Assert that an item matching a pattern is in a list.
///
/// ```ignore
/// assert_emitted!(result.effects, Effect::Host(HostCall::OnAction));
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $items.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected item matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $items
        );
    };
}

/// Assert that no item matching a pattern is in a list.
#[macro_export]
macro_rules! assert_not_emitted {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$items.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected item matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $items
        );
    };
}

/// Find the first item matching a pattern.
#[macro_export]
macro_rules! find_emitted {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        $items.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count items matching a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($items:expr, $pattern:pat $(if $guard:expr)?) => {
        $items.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
