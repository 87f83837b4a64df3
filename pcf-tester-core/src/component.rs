//! Component trait for pure UI elements

use ratatui::{layout::Rect, Frame};

use crate::event::EventKind;

/// A pure UI component that renders based on props and emits messages
///
/// Components follow these rules:
/// 1. Props contain ALL read-only data needed for rendering
/// 2. `handle_event` returns messages, never mutates control state
/// 3. `render` is a pure function of props (plus internal UI state like scroll position)
///
/// Internal UI state (cursor, scroll offset) can be stored in `&mut self`,
/// but the event log and property bag only change through the control.
///
/// # Example
///
/// ```ignore
/// use pcf_tester::{Component, EventKind, Frame, Rect};
///
/// struct ModeLabel;
///
/// struct ModeLabelProps<'a> {
///     mode: &'a str,
/// }
///
/// impl Component<UiMsg> for ModeLabel {
///     type Props<'a> = ModeLabelProps<'a>;
///
///     fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
///         frame.render_widget(Paragraph::new(format!("Mode:{}", props.mode)), area);
///     }
/// }
/// ```
pub trait Component<M> {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Handle an event and return messages for the run loop
    ///
    /// Returns any type implementing `IntoIterator<Item = M>`:
    /// - `None` - nothing to do (most common)
    /// - `Some(msg)` - single message
    /// - `vec![...]` - several messages
    ///
    /// Default implementation returns nothing (render-only components).
    #[allow(unused_variables)]
    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = M> {
        None::<M>
    }

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
