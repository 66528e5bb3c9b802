//! Time-bounded message deduplication guard.
//!
//! Best-effort protection against the same source message producing two
//! tickets (e.g. a chat gateway redelivering an event). Entries expire
//! after a bounded window; this is not a durable dedup index and is not a
//! correctness guarantee.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Sliding-window set of recently processed message identifiers.
pub struct RecentMessageGuard {
    window: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl RecentMessageGuard {
    /// Create a guard with the given expiry window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record a message identifier, returning `false` if it was already
    /// seen within the window.
    ///
    /// Expired entries are pruned on every call, so the map stays bounded
    /// by the arrival rate times the window.
    pub async fn check_and_record(&self, message_id: &str) -> bool {
        let now = Instant::now();
        let mut seen = self.seen.lock().await;

        seen.retain(|_, recorded| now.duration_since(*recorded) < self.window);

        if seen.contains_key(message_id) {
            return false;
        }
        seen.insert(message_id.to_owned(), now);
        true
    }
}
