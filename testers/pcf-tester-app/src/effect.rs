//! Effects - side effects declared by the reducer
//!
//! The reducer never touches the host, the mode store or the timer queue.
//! It returns these and the [`Control`](crate::control::Control) carries
//! them out in order.

use std::time::Duration;

use pcf_tester::HostCall;

use crate::action::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Invoke a host callback
    Host(HostCall),
    /// Deliver `action` after `delay`
    Schedule { delay: Duration, action: Action },
    /// Store a new mode
    PersistMode(String),
}

impl From<HostCall> for Effect {
    fn from(call: HostCall) -> Self {
        Effect::Host(call)
    }
}
