//! Terminal event polling
//!
//! A tokio task wakes every [`PollerConfig::idle_sleep`], drains whatever
//! crossterm has buffered and forwards it as one batch on a channel. The run
//! loop `select!`s on that channel next to its timer deadline.
//!
//! Key releases never leave the poller, and a burst of resizes arrives as the
//! last size only.

use crate::event::EventKind;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal input the poller forwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    Key(crossterm::event::KeyEvent),
    Paste(String),
    Resize(u16, u16),
}

impl RawEvent {
    /// Keep key presses, repeats, pastes and resizes.
    ///
    /// Key releases (reported on Windows) are dropped so typed characters are
    /// not doubled in the command input.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Release => None,
            Event::Key(key) => Some(RawEvent::Key(key)),
            Event::Paste(text) => Some(RawEvent::Paste(text)),
            Event::Resize(width, height) => Some(RawEvent::Resize(width, height)),
            _ => None,
        }
    }
}

impl From<RawEvent> for EventKind {
    fn from(raw: RawEvent) -> Self {
        match raw {
            RawEvent::Key(key) => EventKind::Key(key),
            RawEvent::Paste(text) => EventKind::Paste(text),
            RawEvent::Resize(width, height) => EventKind::Resize(width, height),
        }
    }
}

/// Poller timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// How long the first poll of a cycle waits for input
    pub poll_timeout: Duration,
    /// Pause between cycles
    pub idle_sleep: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(10),
            idle_sleep: Duration::from_millis(16),
        }
    }
}

/// Collapse each run of consecutive resizes into its final size.
pub fn coalesce_resizes(batch: Vec<RawEvent>) -> Vec<RawEvent> {
    let mut out: Vec<RawEvent> = Vec::with_capacity(batch.len());
    for raw in batch {
        if let (RawEvent::Resize(..), Some(RawEvent::Resize(..))) = (&raw, out.last()) {
            out.pop();
        }
        out.push(raw);
    }
    out
}

/// Everything crossterm has ready, waiting at most `timeout` for the first.
fn read_ready(timeout: Duration) -> Vec<RawEvent> {
    let mut batch = Vec::new();
    let mut wait = timeout;
    loop {
        match event::poll(wait) {
            Ok(true) => {}
            Ok(false) => break,
            Err(error) => {
                warn!(%error, "Terminal poll failed");
                break;
            }
        }
        match event::read() {
            Ok(event) => batch.extend(RawEvent::from_terminal(event)),
            Err(error) => {
                warn!(%error, "Terminal read failed");
                break;
            }
        }
        wait = Duration::ZERO;
    }
    coalesce_resizes(batch)
}

/// Spawn the polling task. It stops when `cancel_token` fires or the
/// receiving side of `tx` is dropped.
pub fn spawn_event_poller(
    tx: mpsc::UnboundedSender<RawEvent>,
    config: PollerConfig,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    // leave nothing buffered for the shell
                    let dropped = read_ready(Duration::ZERO).len();
                    info!(dropped, "Event poller cancelled");
                    return;
                }
                _ = tokio::time::sleep(config.idle_sleep) => {
                    for raw in read_ready(config.poll_timeout) {
                        if tx.send(raw).is_err() {
                            debug!("Event channel closed, stopping poller");
                            return;
                        }
                    }
                }
            }
        }
    })
}
