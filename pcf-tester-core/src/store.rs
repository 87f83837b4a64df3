//! Middleware hooks around control dispatch

use crate::action::{Action, ActionSummary};
use crate::error::ControlError;

/// Middleware trait for intercepting actions
///
/// Implement this trait to add tracing, counting or recording to a control
/// store without touching the reducer.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer returned successfully
    fn after(&mut self, action: &A, state_changed: bool);

    /// Called when the reducer failed
    #[allow(unused_variables)]
    fn fault(&mut self, action: &A, error: &ControlError) {}
}

/// Middleware that traces every dispatch
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }
}

impl<A: ActionSummary> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(
                action = %action.name(),
                summary = %action.summary(),
                "Dispatching action"
            );
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %action.name(),
                refresh = state_changed,
                "Action processed"
            );
        }
    }

    fn fault(&mut self, action: &A, error: &ControlError) {
        tracing::warn!(action = %action.name(), %error, "Action raised a fault");
    }
}
