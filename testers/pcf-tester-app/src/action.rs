//! Everything that can happen to the tester control
//!
//! Action names double as event kinds in the log: `init`, `updateView`,
//! `getOutputs` and `Command` each get their own running count.

use pcf_tester::{ActionSummary, ControlState};

use crate::command::Command;

/// Actions dispatched to the tester store
///
/// # Categories
/// - `lifecycle`: calls made by the host
/// - `user`: commands typed by the developer
/// - `timer`: deferred work coming due
#[derive(pcf_tester::Action, Clone, Debug, PartialEq)]
#[action(rename_all = "camelCase")]
pub enum Action {
    /// Control attached; carries the host-persisted control state
    #[action(category = "lifecycle")]
    Init { control_state: Option<ControlState> },

    #[action(category = "lifecycle")]
    UpdateView,

    #[action(category = "lifecycle")]
    GetOutputs,

    #[action(category = "lifecycle")]
    Destroy,

    #[action(rename = "Command", category = "user")]
    Command(Command),

    /// Timer `i` of a `notify` batch came due
    #[action(category = "timer")]
    NotifyFired(u32),
}

/// Marker shown in the Event column for each logged event kind.
pub fn event_marker(kind: &str) -> &'static str {
    match kind {
        "init" => "🟢",
        "updateView" => "🔶",
        "Command" => "🚀",
        "getOutputs" => "🔼",
        _ => "•",
    }
}

impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::Init { control_state } => format!(
                "Init {{ control_state: {} keys }}",
                control_state.as_ref().map_or(0, |s| s.len())
            ),
            Action::Command(cmd) => format!("Command({})", cmd.verb()),
            _ => format!("{:?}", self),
        }
    }
}
