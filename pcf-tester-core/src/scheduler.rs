//! Deferred actions with an injectable clock
//!
//! Controls never call `sleep` or spawn timers themselves. They ask for an
//! action to be delivered after a delay; the driver keeps those requests in a
//! [`TimerQueue`] and drains whatever is due against a [`Clock`]. Production
//! code uses [`SystemClock`]; tests move a [`ManualClock`] forward and get
//! exact, repeatable firing order.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pcf_tester_core::scheduler::{Clock, ManualClock, TimerQueue};
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerQueue::new();
//! for i in 0..3u32 {
//!     timers.schedule(clock.elapsed(), Duration::from_millis(100) * i, i);
//! }
//!
//! assert_eq!(timers.pop_due(clock.elapsed()), vec![0]);
//! clock.advance(Duration::from_millis(250));
//! assert_eq!(timers.pop_due(clock.elapsed()), vec![1, 2]);
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};

/// Source of time for timers and log timestamps.
pub trait Clock {
    /// Monotonic time since the clock was created
    fn elapsed(&self) -> Duration;

    /// Wall-clock time, used to stamp log rows
    fn wall(&self) -> DateTime<Utc>;
}

/// Real time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep a handle after moving
/// the clock into a control.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: DateTime<Utc>,
    elapsed_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(Utc.timestamp_opt(0, 0).single().unwrap_or_default())
    }

    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, AtomicOrdering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(AtomicOrdering::SeqCst))
    }

    fn wall(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::zero());
        self.origin + elapsed
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        (**self).wall()
    }
}

struct Entry<A> {
    deadline: Duration,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Equal deadlines fire in scheduling order
        self.deadline
            .cmp(&other.deadline)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Pending deferred actions ordered by deadline.
///
/// Timers are fire-and-forget: there is no per-timer cancellation, only
/// [`TimerQueue::clear`] for teardown.
pub struct TimerQueue<A> {
    heap: BinaryHeap<Reverse<Entry<A>>>,
    next_seq: u64,
}

impl<A> std::fmt::Debug for TimerQueue<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.heap.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `action` to become due at `now + delay`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry {
            deadline: now.saturating_add(delay),
            seq,
            action,
        }));
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Duration) -> Vec<A> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            if let Some(Reverse(entry)) = self.heap.pop() {
                due.push(entry.action);
            }
        }
        due
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    /// Time left until the earliest pending timer, zero when one is overdue.
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(now))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
