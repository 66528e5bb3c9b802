//! Completion signal model — asynchronous notifications from the build worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of completion event reported by the external build worker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// A queued/building ticket's artifact is live.
    BuildReady,
    /// A bug ticket's fix landed.
    BugFixed,
    /// A feature ticket's change landed.
    FeatureAdded,
    /// A brand-new app was scaffolded.
    AppCreated,
}

/// One completion signal awaiting processing.
///
/// Signals are consumed at most once: each is deleted from the source
/// after its notifications are issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionSignal {
    /// Unique record identifier.
    pub id: String,
    /// Event kind.
    pub kind: SignalKind,
    /// App tag the event applies to, when known.
    pub app: Option<String>,
    /// Handle of the affected ticket, when known.
    pub handle: Option<String>,
    /// Direct-message recipient, when the worker named one.
    pub recipient: Option<String>,
    /// Human-readable event description from the worker.
    pub message: String,
    /// When the worker emitted the signal.
    pub created_at: DateTime<Utc>,
}

impl CompletionSignal {
    /// Construct a new signal with a generated identifier.
    #[must_use]
    pub fn new(
        kind: SignalKind,
        app: Option<String>,
        handle: Option<String>,
        recipient: Option<String>,
        message: String,
    ) -> Self {
        Self {
            id: format!("sig:{}", Uuid::new_v4()),
            kind,
            app,
            handle,
            recipient,
            message,
            created_at: Utc::now(),
        }
    }
}
