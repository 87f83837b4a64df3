//! Scrollable event log table

use crossterm::event::{KeyCode, KeyModifiers};
use pcf_tester_core::{Component, EventKind, EventLog};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

const HEADER: [&str; 4] = ["#", "Event", "Source", "message"];

/// Props for LogTable component
pub struct LogTableProps<'a> {
    /// The log, newest row first
    pub log: &'a EventLog,
    /// Whether PageUp/PageDown scroll this table
    pub is_focused: bool,
}

/// The event log as a four-column table
///
/// Rows are shown in log order, so the newest entry is on top. Scrolling is
/// internal UI state; the table emits no messages.
#[derive(Default)]
pub struct LogTable {
    scroll_offset: usize,
    /// Body rows visible at the last render
    page: usize,
}

impl LogTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.page.max(1))
    }

    fn scroll_by(&mut self, delta: isize, len: usize) {
        let next = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_offset = next.min(self.max_offset(len));
    }
}

impl<M> Component<M> for LogTable {
    type Props<'a> = LogTableProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = M> {
        if !props.is_focused {
            return None::<M>;
        }
        let len = props.log.len();
        let page = self.page.max(1) as isize;

        if let EventKind::Key(key) = event {
            match key.code {
                KeyCode::PageDown => self.scroll_by(page, len),
                KeyCode::PageUp => self.scroll_by(-page, len),
                KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.scroll_offset = 0
                }
                KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.scroll_offset = self.max_offset(len)
                }
                _ => {}
            }
        }
        None::<M>
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        // Borders plus the header row
        self.page = area.height.saturating_sub(3) as usize;
        let len = props.log.len();
        self.scroll_offset = self.scroll_offset.min(self.max_offset(len));

        let header = Row::new(HEADER).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows = props
            .log
            .rows()
            .skip(self.scroll_offset)
            .take(self.page)
            .map(|row| {
                Row::new([
                    row.index.to_string(),
                    row.event_name.clone(),
                    row.source.clone(),
                    row.message.clone(),
                ])
            });

        let title = if self.scroll_offset > 0 {
            format!(" {} events (+{}) ", len, self.scroll_offset)
        } else {
            format!(" {} events ", len)
        };

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Length(24),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(table, area);
    }
}
