//! Event log and per-kind counters
//!
//! The log is stored newest-first. A row's `index` is assigned at insertion
//! as `len() + 1`, so indices grow monotonically over insertions but do not
//! match a row's position, and they restart after a clear.

use std::collections::{vec_deque, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEventRow {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// Lifecycle emoji plus its running count, e.g. `🔶 3`
    pub event_name: String,
    pub source: String,
    pub message: String,
}

/// Newest-first list of [`LogEventRow`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    rows: VecDeque<LogEventRow>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a row and return the index it was given.
    pub fn push(
        &mut self,
        timestamp: DateTime<Utc>,
        event_name: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> usize {
        let index = self.rows.len() + 1;
        self.rows.push_front(LogEventRow {
            index,
            timestamp,
            event_name: event_name.into(),
            source: source.into(),
            message: message.into(),
        });
        index
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows newest first.
    pub fn rows(&self) -> vec_deque::Iter<'_, LogEventRow> {
        self.rows.iter()
    }

    /// Most recently inserted row.
    pub fn newest(&self) -> Option<&LogEventRow> {
        self.rows.front()
    }
}

/// Occurrence counters keyed by event kind (`updateView`, `size`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCounts {
    counts: HashMap<String, u32>,
}

impl EventCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the counter for `kind` and return its new value.
    pub fn increment(&mut self, kind: &str) -> u32 {
        let count = self.counts.entry(kind.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current value, zero for kinds never seen.
    pub fn get(&self, kind: &str) -> u32 {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
