//! Durable single-consumer FIFO build queue.
//!
//! Serializes "approved → build" work for one external build worker. All
//! mutations happen under one mutex and the full [`QueueState`] snapshot
//! is written to `SQLite` before the lock is released, so a restart
//! resumes with the same current build and queue order. Ordering is
//! strict FIFO; high-tier approvals enter at the tail like any other.

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::queue::{QueueEntry, QueueSnapshot, QueueState, QueueStatus};
use crate::persistence::queue_repo::QueueRepo;
use crate::Result;

/// Outcome of handing a ticket to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandOff {
    /// The worker was idle; the build starts immediately.
    Started,
    /// The worker was busy; the entry waits at the given 1-based position.
    Queued(usize),
}

/// Process-wide build queue over a persisted [`QueueState`] singleton.
pub struct BuildQueue {
    state: Mutex<QueueState>,
    repo: QueueRepo,
}

impl BuildQueue {
    /// Create a queue with fresh idle state.
    #[must_use]
    pub fn new(repo: QueueRepo) -> Self {
        Self {
            state: Mutex::new(QueueState::new()),
            repo,
        }
    }

    /// Recover the queue from its persisted snapshot, or start fresh when
    /// none exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the snapshot exists but cannot be loaded.
    pub async fn recover(repo: QueueRepo) -> Result<Self> {
        let state = match repo.load().await? {
            Some(state) => {
                info!(
                    status = ?state.status,
                    queued = state.queue.len(),
                    "recovered persisted queue state"
                );
                state
            }
            None => QueueState::new(),
        };
        Ok(Self {
            state: Mutex::new(state),
            repo,
        })
    }

    /// Pure read of the queue's current shape.
    pub async fn status(&self) -> QueueSnapshot {
        let state = self.state.lock().await;
        QueueSnapshot {
            busy: state.current.is_some(),
            current_title: state.current.as_ref().map(|e| e.title.clone()),
            queue_length: state.queue.len(),
            last_error: state.last_error.clone(),
        }
    }

    /// Handle of the in-flight build, if any.
    pub async fn current_handle(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.current.as_ref().map(|e| e.handle.clone())
    }

    /// Start the entry immediately if the worker is idle and nothing is
    /// waiting, else append it to the tail.
    ///
    /// An empty worker slot with a non-empty queue (after a failed build,
    /// or between a completion and the next dispatch) still counts as
    /// busy: a new entry joins the tail behind the older ones.
    pub async fn hand_off(&self, entry: QueueEntry) -> HandOff {
        let mut state = self.state.lock().await;
        let outcome = if state.current.is_some() || !state.queue.is_empty() {
            state.queue.push_back(entry);
            HandOff::Queued(state.queue.len())
        } else {
            state.status = QueueStatus::Processing;
            state.current = Some(entry);
            HandOff::Started
        };
        self.persist(&state).await;
        outcome
    }

    /// Append an entry to the tail, returning its 1-based position.
    pub async fn enqueue(&self, entry: QueueEntry) -> usize {
        let mut state = self.state.lock().await;
        state.queue.push_back(entry);
        let position = state.queue.len();
        self.persist(&state).await;
        position
    }

    /// Consumer-only: pop the head when the worker becomes idle.
    ///
    /// Returns the entry now being built, or `None` when the queue is
    /// empty (the worker goes idle). A dispatch while a build is already
    /// current is ignored with a warning.
    pub async fn dispatch(&self) -> Option<QueueEntry> {
        let mut state = self.state.lock().await;
        if state.current.is_some() {
            warn!("dispatch called while a build is current; ignoring");
            return None;
        }

        let popped = state.queue.pop_front();
        match &popped {
            Some(entry) => {
                state.status = QueueStatus::Processing;
                state.current = Some(entry.clone());
                info!(handle = %entry.handle, title = %entry.title, "dispatching queued build");
            }
            None => {
                state.status = QueueStatus::Idle;
            }
        }
        self.persist(&state).await;
        popped
    }

    /// Worker-integration-only: the current build finished successfully.
    pub async fn complete(&self) {
        let mut state = self.state.lock().await;
        state.current = None;
        state.status = QueueStatus::Idle;
        state.last_error = None;
        self.persist(&state).await;
    }

    /// Worker-integration-only: the current build failed.
    pub async fn fail(&self, err: &str) {
        let mut state = self.state.lock().await;
        state.current = None;
        state.status = QueueStatus::Error;
        state.last_error = Some(err.to_owned());
        self.persist(&state).await;
    }

    /// Persist the snapshot and check the processing/current invariant.
    ///
    /// Persistence failures are logged, not propagated: the in-memory
    /// state stays authoritative for the process lifetime.
    async fn persist(&self, state: &QueueState) {
        if !state.invariant_holds() {
            error!(
                status = ?state.status,
                has_current = state.current.is_some(),
                "queue invariant violated (processing iff current); continuing"
            );
        }
        if let Err(err) = self.repo.save(state).await {
            error!(%err, "failed to persist queue state; in-memory state remains authoritative");
        }
    }
}
