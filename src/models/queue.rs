//! Build queue state — a durable, single-consumer FIFO.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Worker-facing status of the build queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// No build in flight.
    Idle,
    /// Exactly one build in flight.
    Processing,
    /// The last build failed; no build in flight until redispatched.
    Error,
}

/// One queued build job wrapping a ticket reference.
///
/// Created when a reviewer sends a ticket to the build worker while the
/// worker is busy; consumed in FIFO order; never reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    /// Handle of the ticket this entry builds.
    pub handle: String,
    /// Ticket title, for status displays.
    pub title: String,
    /// Target app tag.
    pub app: String,
    /// When the entry joined the queue.
    pub enqueued_at: DateTime<Utc>,
}

/// Process-wide queue singleton, persisted whole on every mutation.
///
/// Invariant: `status == Processing` iff `current` is set; at most one
/// entry is ever current.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueState {
    /// Busy/idle/error status.
    pub status: QueueStatus,
    /// The in-flight build, if any.
    pub current: Option<QueueEntry>,
    /// Waiting entries in arrival order.
    pub queue: VecDeque<QueueEntry>,
    /// Message of the most recent build failure.
    pub last_error: Option<String>,
}

impl QueueState {
    /// Fresh idle state with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: QueueStatus::Idle,
            current: None,
            queue: VecDeque::new(),
            last_error: None,
        }
    }

    /// Check the processing/current invariant.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        (self.status == QueueStatus::Processing) == self.current.is_some()
    }
}

impl Default for QueueState {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure read snapshot returned by `BuildQueue::status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Whether a build is in flight.
    pub busy: bool,
    /// Title of the in-flight build, if any.
    pub current_title: Option<String>,
    /// Number of waiting entries (excludes the in-flight build).
    pub queue_length: usize,
    /// Message of the most recent build failure, if any.
    pub last_error: Option<String>,
}
