//! Full-screen view: command line above the event log
//!
//! ```text
//! Command:                                   Mode:error,size
//! ┌──────────────────────────────────────────────────────────┐
//! │add 3                                                     │
//! └──────────────────────────────────────────────────────────┘
//! ┌ 3 events ────────────────────────────────────────────────┐
//! │#    Event     Source                  message            │
//! ...
//! OnAction 0                                 Ctrl+C to quit
//! ```

use pcf_tester::{Component, EventKind};
use pcf_tester_components::{CommandInput, CommandInputProps, LogTable, LogTableProps};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::HeightMode;
use crate::state::TesterState;

/// Log table height, borders and header included, in fixed height mode.
pub const FIXED_TABLE_ROWS: u16 = 12;

const PLACEHOLDER: &str = "verb args...  (event, set k v, mode size, add 3, notify 3 500)";

/// Messages from the view to the run loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMsg {
    /// The command line was edited
    LineChanged(String),
    /// Enter on a non-blank command line
    Submit(String),
}

pub struct TesterViewProps<'a> {
    pub state: &'a TesterState,
    /// Command line being edited
    pub line: &'a str,
    pub height: HeightMode,
    /// Last lifecycle failure, if the control is faulted
    pub fault: Option<&'a str>,
    /// `OnAction` signals the host has seen
    pub actions: u32,
}

fn input_props(line: &str) -> CommandInputProps<'_, UiMsg> {
    CommandInputProps {
        value: line,
        placeholder: PLACEHOLDER,
        is_focused: true,
        on_change: UiMsg::LineChanged,
        on_submit: UiMsg::Submit,
    }
}

#[derive(Default)]
pub struct TesterView {
    input: CommandInput,
    table: LogTable,
}

impl TesterView {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_header(frame: &mut Frame, area: Rect, mode: &str) {
        let width = u16::try_from(mode.chars().count())
            .unwrap_or(u16::MAX)
            .saturating_add(5);
        let [label, mode_area] =
            Layout::horizontal([Constraint::Min(8), Constraint::Length(width)]).areas(area);
        frame.render_widget(Paragraph::new("Command:".bold()), label);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Mode:"),
                Span::styled(mode.to_string(), Style::default().fg(Color::Cyan)),
            ]))
            .right_aligned(),
            mode_area,
        );
    }

    fn render_status(frame: &mut Frame, area: Rect, props: &TesterViewProps<'_>) {
        let line = match props.fault {
            Some(fault) => Line::from(vec![Span::styled(
                format!("⚠ Control error: {fault}"),
                Style::default().fg(Color::Red).bold(),
            )]),
            None => Line::from(vec![
                Span::raw(format!("OnAction {}", props.actions)),
                Span::styled("   Ctrl+C to quit", Style::default().fg(Color::DarkGray)),
            ]),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component<UiMsg> for TesterView {
    type Props<'a> = TesterViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = UiMsg> {
        let mut msgs: Vec<UiMsg> = <CommandInput as Component<UiMsg>>::handle_event(
            &mut self.input,
            event,
            input_props(props.line),
        )
        .into_iter()
        .collect();
        msgs.extend(<LogTable as Component<UiMsg>>::handle_event(
            &mut self.table,
            event,
            LogTableProps {
                log: &props.state.log,
                is_focused: true,
            },
        ));
        msgs
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let (table_height, gap) = match props.height {
            HeightMode::Fixed => (Constraint::Length(FIXED_TABLE_ROWS), Constraint::Fill(1)),
            HeightMode::Auto => (Constraint::Fill(1), Constraint::Length(0)),
        };
        let [header, input, table, _, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            table_height,
            gap,
            Constraint::Length(1),
        ])
        .areas(area);

        Self::render_header(frame, header, &props.state.mode);
        <CommandInput as Component<UiMsg>>::render(
            &mut self.input,
            frame,
            input,
            input_props(props.line),
        );
        <LogTable as Component<UiMsg>>::render(
            &mut self.table,
            frame,
            table,
            LogTableProps {
                log: &props.state.log,
                is_focused: true,
            },
        );
        Self::render_status(frame, status, &props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pcf_tester::testing::{key_event, typed, RenderHarness};
    use pretty_assertions::assert_eq;

    fn state() -> TesterState {
        let mut state = TesterState {
            mode: "error,size".into(),
            ..Default::default()
        };
        state.set_event("Command");
        state.log_event(Utc::now(), "add", "Test message 1");
        state
    }

    fn props<'a>(state: &'a TesterState, line: &'a str) -> TesterViewProps<'a> {
        TesterViewProps {
            state,
            line,
            height: HeightMode::Auto,
            fault: None,
            actions: 2,
        }
    }

    #[test]
    fn test_render_header_log_and_status() {
        let mut render = RenderHarness::new(80, 14);
        let mut view = TesterView::new();
        let state = state();

        let output = render.render_to_string_plain(|frame| {
            view.render(frame, frame.area(), props(&state, "add 3"));
        });

        assert!(output.contains("Command:"));
        assert!(output.contains("Mode:error,size"));
        assert!(output.contains("add 3"));
        assert!(output.contains("Test message 1"));
        assert!(output.contains("OnAction 2"));
    }

    #[test]
    fn test_render_fault() {
        let mut render = RenderHarness::new(80, 14);
        let mut view = TesterView::new();
        let state = state();

        let output = render.render_to_string_plain(|frame| {
            let props = TesterViewProps {
                fault: Some("Error from updateView"),
                ..props(&state, "")
            };
            view.render(frame, frame.area(), props);
        });

        assert!(output.contains("Control error: Error from updateView"));
        assert!(!output.contains("OnAction"));
    }

    #[test]
    fn test_fixed_height_leaves_gap() {
        let mut render = RenderHarness::new(80, 40);
        let mut view = TesterView::new();
        let state = state();

        let output = render.render_to_string_plain(|frame| {
            let props = TesterViewProps {
                height: HeightMode::Fixed,
                ..props(&state, "")
            };
            view.render(frame, frame.area(), props);
        });

        let lines: Vec<&str> = output.lines().collect();
        // header + input box + table, then the table's bottom border
        let bottom = 1 + 3 + FIXED_TABLE_ROWS as usize - 1;
        assert!(lines[bottom].starts_with('└'));
        assert!(lines[bottom + 1].is_empty());
    }

    #[test]
    fn test_render_mode_longer_than_u16() {
        let mut render = RenderHarness::new(40, 10);
        let mut view = TesterView::new();
        let mut state = state();
        state.mode = "size,".repeat(20_000);

        let output = render.render_to_string_plain(|frame| {
            view.render(frame, frame.area(), props(&state, ""));
        });

        let header = output.lines().next().unwrap_or("");
        assert!(header.starts_with("Command:"));
        assert!(header.contains("size,"));
        assert!(output.contains("OnAction 2"));
    }

    #[test]
    fn test_typing_then_enter_submits() {
        let mut view = TesterView::new();
        let state = state();
        let mut line = String::new();
        let mut submitted = Vec::new();

        let mut events = typed("mode size");
        events.push(key_event("enter"));
        for event in events {
            let msgs: Vec<UiMsg> = view
                .handle_event(&event, props(&state, &line))
                .into_iter()
                .collect();
            for msg in msgs {
                match msg {
                    UiMsg::LineChanged(next) => line = next,
                    UiMsg::Submit(cmd) => submitted.push(cmd),
                }
            }
        }

        assert_eq!(submitted, vec!["mode size".to_string()]);
        assert_eq!(line, "");
    }
}
