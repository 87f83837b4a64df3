//! Tester state - everything the control owns between host calls

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pcf_tester::{ControlState, EventCounts, EventLog, DEFAULT_MODE};

use crate::action::event_marker;

/// Output field name to value, returned whole on every `getOutputs`.
pub type PropertyBag = BTreeMap<String, String>;

/// State of one tester control instance
#[derive(Debug, Clone)]
pub struct TesterState {
    /// Newest row first
    pub log: EventLog,
    pub counts: EventCounts,
    pub property_bag: PropertyBag,
    /// Mode shown in the view header
    pub mode: String,
    /// Local copy of the host-persisted control state
    pub control_state: Option<ControlState>,
    /// Host action owed on the next view update
    pub schedule_event: bool,
    /// Marker plus running count of the event being handled, e.g. `🔶 3`
    pub event_display_name: String,
}

impl Default for TesterState {
    fn default() -> Self {
        Self {
            log: EventLog::new(),
            counts: EventCounts::new(),
            property_bag: PropertyBag::new(),
            mode: DEFAULT_MODE.to_string(),
            control_state: None,
            schedule_event: false,
            event_display_name: String::new(),
        }
    }
}

impl TesterState {
    /// Start handling an event of `kind`: bump its count and tag
    /// subsequent rows with it.
    pub fn set_event(&mut self, kind: &str) {
        let n = self.counts.increment(kind);
        self.event_display_name = format!("{} {}", event_marker(kind), n);
    }

    /// Prepend a row tagged with the current event.
    pub fn log_event(
        &mut self,
        now: DateTime<Utc>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.log
            .push(now, self.event_display_name.clone(), source, message);
    }

    /// Count of `kind` seen so far, 0 if never.
    pub fn count(&self, kind: &str) -> u32 {
        self.counts.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_event_counts_per_kind() {
        let mut state = TesterState::default();
        state.set_event("updateView");
        state.set_event("updateView");
        assert_eq!(state.event_display_name, "🔶 2");
        state.set_event("Command");
        assert_eq!(state.event_display_name, "🚀 1");
        assert_eq!(state.count("updateView"), 2);
        assert_eq!(state.count("getOutputs"), 0);
    }

    #[test]
    fn test_log_event_tags_rows() {
        let mut state = TesterState::default();
        state.set_event("init");
        state.log_event(Utc::now(), "init", "---");
        let row = state.log.newest().unwrap();
        assert_eq!(row.event_name, "🟢 1");
        assert_eq!(row.source, "init");
        assert_eq!(row.index, 1);
    }
}
