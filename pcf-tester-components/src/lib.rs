//! Terminal components for pcf-tester views
//!
//! Components implement the `Component<M>` trait and emit messages via
//! callback functions passed through Props.
//!
//! # Components
//!
//! - [`CommandInput`] - Single-line command prompt with history recall
//! - [`LogTable`] - The event log as a scrollable `#`/Event/Source/message table
//!
//! # Example
//!
//! ```ignore
//! use pcf_tester_components::{CommandInput, CommandInputProps};
//!
//! // In your render function:
//! let mut input = CommandInput::default();
//! input.render(frame, area, CommandInputProps {
//!     value: &ui.line,
//!     placeholder: "verb args...",
//!     is_focused: true,
//!     on_change: UiMsg::LineChanged,
//!     on_submit: UiMsg::Submit,
//! });
//! ```

mod command_input;
mod log_table;

pub use command_input::{CommandInput, CommandInputProps};
pub use log_table::{LogTable, LogTableProps};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{CommandInput, CommandInputProps, LogTable, LogTableProps};
}
