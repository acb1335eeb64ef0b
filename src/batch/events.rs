//! Batch lifecycle events.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Lifecycle events emitted while a batch runs.
///
/// Delivery is best-effort: events are pushed with `try_send` and dropped
/// when the channel is full or closed, so an observer can never stall or
/// fail a batch.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Emitted once, before the first launch.
    Started {
        total: usize,
        concurrency: usize,
        at: DateTime<Utc>,
    },
    /// Emitted after each item settles permanently.
    Progress {
        succeeded: usize,
        failed: usize,
        in_flight: usize,
    },
    /// Emitted when an item is scheduled for another attempt.
    Retried {
        index: usize,
        attempt: u32,
        delay: Duration,
    },
    /// Emitted once, after the last in-flight item settles.
    Finished {
        succeeded: usize,
        failed: usize,
        duration: Duration,
        at: DateTime<Utc>,
    },
}

impl BatchEvent {
    /// Stable label for log fields and filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchEvent::Started { .. } => "started",
            BatchEvent::Progress { .. } => "progress",
            BatchEvent::Retried { .. } => "retried",
            BatchEvent::Finished { .. } => "finished",
        }
    }
}

/// Push an event without blocking; drops it if the observer is behind.
pub(crate) fn emit(events: Option<&mpsc::Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(sender) = events {
        let _ = sender.try_send(event);
    }
}
