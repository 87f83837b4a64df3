//! Action trait for lifecycle calls and commands flowing into a control

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a control store
///
/// Actions describe one thing the host or the user asked the control to do:
/// a lifecycle call, a typed command, a timer that came due. They should be:
/// - Clone: Actions may be logged, replayed, or re-queued by the scheduler
/// - Debug: For tracing
/// - Send + 'static: Timer payloads cross into the async run loop
///
/// Use `#[derive(Action)]` from `pcf-tester-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Optional grouping for actions, generated by `#[action(category = "...")]`
pub trait ActionCategory: Action {
    /// Category of this action, `None` when the variant carries no category
    fn category(&self) -> Option<&'static str>;
}

/// Short human readable description used by logging middleware
///
/// The default falls back to `Debug`. Override it for actions that carry
/// large payloads such as whole host snapshots.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
