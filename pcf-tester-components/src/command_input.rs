//! Single-line command input with recall of earlier commands

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use pcf_tester_core::{Component, EventKind};

/// Props for CommandInput component
pub struct CommandInputProps<'a, M> {
    /// Current line
    pub value: &'a str,
    /// Placeholder text when empty
    pub placeholder: &'a str,
    /// Whether this component has focus
    pub is_focused: bool,
    /// Callback when the line changes
    pub on_change: fn(String) -> M,
    /// Callback when the user presses Enter on a non-blank line
    pub on_submit: fn(String) -> M,
}

/// A single-line command prompt
///
/// Handles typing, pasting, backspace/delete and cursor movement. Enter
/// submits the line and clears it. Up/Down walk through submitted lines.
#[derive(Default)]
pub struct CommandInput {
    /// Cursor position (byte index)
    cursor: usize,
    history: Vec<String>,
    /// Position while walking history, `None` when editing a fresh line
    recall: Option<usize>,
}

impl CommandInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines submitted so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn clamp_cursor(&mut self, value: &str) {
        self.cursor = self.cursor.min(value.len());
        while self.cursor > 0 && !value.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    fn prev_boundary(value: &str, from: usize) -> usize {
        value[..from]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(value: &str, from: usize) -> usize {
        value[from..]
            .chars()
            .next()
            .map(|c| from + c.len_utf8())
            .unwrap_or(from)
    }

    fn insert_str(&mut self, value: &str, text: &str) -> String {
        let mut line = String::with_capacity(value.len() + text.len());
        line.push_str(&value[..self.cursor]);
        line.push_str(text);
        line.push_str(&value[self.cursor..]);
        self.cursor += text.len();
        line
    }

    fn backspace(&mut self, value: &str) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        let start = Self::prev_boundary(value, self.cursor);
        let line = format!("{}{}", &value[..start], &value[self.cursor..]);
        self.cursor = start;
        Some(line)
    }

    fn delete(&self, value: &str) -> Option<String> {
        if self.cursor >= value.len() {
            return None;
        }
        let end = Self::next_boundary(value, self.cursor);
        Some(format!("{}{}", &value[..self.cursor], &value[end..]))
    }

    fn recall_older(&mut self) -> Option<String> {
        if self.history.is_empty() {
            return None;
        }
        let idx = match self.recall {
            None => self.history.len() - 1,
            Some(0) => return None,
            Some(i) => i - 1,
        };
        self.recall = Some(idx);
        let line = self.history[idx].clone();
        self.cursor = line.len();
        Some(line)
    }

    fn recall_newer(&mut self) -> Option<String> {
        let idx = self.recall?;
        if idx + 1 >= self.history.len() {
            self.recall = None;
            self.cursor = 0;
            return Some(String::new());
        }
        self.recall = Some(idx + 1);
        let line = self.history[idx + 1].clone();
        self.cursor = line.len();
        Some(line)
    }
}

impl<M> Component<M> for CommandInput {
    type Props<'a> = CommandInputProps<'a, M>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = M> {
        if !props.is_focused {
            return Vec::new();
        }

        self.clamp_cursor(props.value);

        match event {
            EventKind::Paste(text) => {
                // A pasted newline does not submit
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                if text.is_empty() {
                    return Vec::new();
                }
                vec![(props.on_change)(self.insert_str(props.value, &text))]
            }
            EventKind::Key(key) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                match key.code {
                    KeyCode::Char('a') => {
                        self.cursor = 0;
                        Vec::new()
                    }
                    KeyCode::Char('e') => {
                        self.cursor = props.value.len();
                        Vec::new()
                    }
                    KeyCode::Char('u') => {
                        self.cursor = 0;
                        self.recall = None;
                        vec![(props.on_change)(String::new())]
                    }
                    _ => Vec::new(),
                }
            }
            EventKind::Key(key) => match key.code {
                KeyCode::Char(c) => {
                    let mut buf = [0u8; 4];
                    vec![(props.on_change)(
                        self.insert_str(props.value, c.encode_utf8(&mut buf)),
                    )]
                }
                KeyCode::Backspace => self
                    .backspace(props.value)
                    .map(props.on_change)
                    .into_iter()
                    .collect(),
                KeyCode::Delete => self
                    .delete(props.value)
                    .map(props.on_change)
                    .into_iter()
                    .collect(),
                KeyCode::Left => {
                    self.cursor = Self::prev_boundary(props.value, self.cursor);
                    Vec::new()
                }
                KeyCode::Right => {
                    self.cursor = Self::next_boundary(props.value, self.cursor);
                    Vec::new()
                }
                KeyCode::Home => {
                    self.cursor = 0;
                    Vec::new()
                }
                KeyCode::End => {
                    self.cursor = props.value.len();
                    Vec::new()
                }
                KeyCode::Up => self.recall_older().map(props.on_change).into_iter().collect(),
                KeyCode::Down => self.recall_newer().map(props.on_change).into_iter().collect(),
                KeyCode::Enter => {
                    if props.value.trim().is_empty() {
                        return Vec::new();
                    }
                    let line = props.value.to_string();
                    if self.history.last() != Some(&line) {
                        self.history.push(line.clone());
                    }
                    self.recall = None;
                    self.cursor = 0;
                    vec![(props.on_submit)(line), (props.on_change)(String::new())]
                }
                _ => Vec::new(),
            },
            EventKind::Resize(..) => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.clamp_cursor(props.value);

        let (text, style) = if props.value.is_empty() {
            (props.placeholder, Style::default().fg(Color::DarkGray))
        } else {
            (props.value, Style::default())
        };

        let border = if props.is_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let paragraph = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(border));
        frame.render_widget(paragraph, area);

        if props.is_focused && area.width > 2 && area.height > 2 {
            let column = props.value[..self.cursor].chars().count() as u16;
            let x = area.x + 1 + column;
            if x < area.x + area.width - 1 {
                frame.set_cursor_position((x, area.y + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcf_tester_core::testing::{key, RenderHarness};

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Change(String),
        Submit(String),
    }

    fn props(value: &str) -> CommandInputProps<'_, Msg> {
        CommandInputProps {
            value,
            placeholder: "verb args...",
            is_focused: true,
            on_change: Msg::Change,
            on_submit: Msg::Submit,
        }
    }

    fn send(input: &mut CommandInput, value: &str, event: EventKind) -> Vec<Msg> {
        input.handle_event(&event, props(value)).into_iter().collect()
    }

    #[test]
    fn test_typing_appends_at_cursor() {
        let mut input = CommandInput::new();
        assert_eq!(
            send(&mut input, "", EventKind::Key(key("a"))),
            vec![Msg::Change("a".into())]
        );
        assert_eq!(
            send(&mut input, "a", EventKind::Key(key("d"))),
            vec![Msg::Change("ad".into())]
        );
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut input = CommandInput::new();
        input.cursor = 3;
        assert_eq!(
            send(&mut input, "add", EventKind::Key(key("backspace"))),
            vec![Msg::Change("ad".into())]
        );
        input.cursor = 0;
        assert!(send(&mut input, "ad", EventKind::Key(key("backspace"))).is_empty());
        assert_eq!(
            send(&mut input, "ad", EventKind::Key(key("delete"))),
            vec![Msg::Change("d".into())]
        );
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = CommandInput::new();
        input.cursor = "set k ✓".len();
        assert_eq!(
            send(&mut input, "set k ✓", EventKind::Key(key("backspace"))),
            vec![Msg::Change("set k ".into())]
        );
    }

    #[test]
    fn test_enter_submits_and_clears() {
        let mut input = CommandInput::new();
        assert_eq!(
            send(&mut input, "add 3", EventKind::Key(key("enter"))),
            vec![Msg::Submit("add 3".into()), Msg::Change(String::new())]
        );
        assert_eq!(input.history(), &["add 3".to_string()]);
    }

    #[test]
    fn test_enter_on_blank_line_is_ignored() {
        let mut input = CommandInput::new();
        assert!(send(&mut input, "   ", EventKind::Key(key("enter"))).is_empty());
        assert!(input.history().is_empty());
    }

    #[test]
    fn test_history_recall() {
        let mut input = CommandInput::new();
        send(&mut input, "add 1", EventKind::Key(key("enter")));
        send(&mut input, "mode size", EventKind::Key(key("enter")));

        assert_eq!(
            send(&mut input, "", EventKind::Key(key("up"))),
            vec![Msg::Change("mode size".into())]
        );
        assert_eq!(
            send(&mut input, "mode size", EventKind::Key(key("up"))),
            vec![Msg::Change("add 1".into())]
        );
        assert!(send(&mut input, "add 1", EventKind::Key(key("up"))).is_empty());
        assert_eq!(
            send(&mut input, "add 1", EventKind::Key(key("down"))),
            vec![Msg::Change("mode size".into())]
        );
        assert_eq!(
            send(&mut input, "mode size", EventKind::Key(key("down"))),
            vec![Msg::Change(String::new())]
        );
    }

    #[test]
    fn test_paste_strips_newlines() {
        let mut input = CommandInput::new();
        assert_eq!(
            send(&mut input, "", EventKind::Paste("notify 3 100\n".into())),
            vec![Msg::Change("notify 3 100".into())]
        );
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut input = CommandInput::new();
        input.cursor = 4;
        assert_eq!(
            send(&mut input, "cls!", EventKind::Key(key("ctrl+u"))),
            vec![Msg::Change(String::new())]
        );
    }

    #[test]
    fn test_unfocused_ignores() {
        let mut input = CommandInput::new();
        let mut p = props("");
        p.is_focused = false;
        let msgs: Vec<_> = input
            .handle_event(&EventKind::Key(key("a")), p)
            .into_iter()
            .collect();
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_render_value_and_placeholder() {
        let mut render = RenderHarness::new(30, 3);
        let mut input = CommandInput::new();

        let output = render.render_to_string_plain(|frame| {
            input.render(frame, frame.area(), props("report"));
        });
        assert!(output.contains("report"));

        let output = render.render_to_string_plain(|frame| {
            input.render(frame, frame.area(), props(""));
        });
        assert!(output.contains("verb args..."));
    }
}
