//! Weekly reward ledger.
//!
//! Append-only token credits per contributor, bucketed by calendar week.
//! Rotation is a pure function of wall-clock time applied lazily before
//! any read or write, so it stays correct even if the process was offline
//! across a week boundary. All mutations happen under one mutex and the
//! full [`LedgerState`] snapshot is persisted before the lock is released.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::models::ledger::{
    week_start, Contribution, ContributorRecord, LeaderboardRow, LedgerState, WeekArchive,
};
use crate::models::ticket::RewardKind;
use crate::persistence::ledger_repo::LedgerRepo;
use crate::Result;

/// Process-wide reward ledger over a persisted [`LedgerState`] singleton.
pub struct RewardLedger {
    state: Mutex<LedgerState>,
    repo: LedgerRepo,
}

impl RewardLedger {
    /// Create a ledger with a fresh bucket for the current week.
    #[must_use]
    pub fn new(repo: LedgerRepo) -> Self {
        Self {
            state: Mutex::new(LedgerState::new(Utc::now())),
            repo,
        }
    }

    /// Recover the ledger from its persisted snapshot, or start fresh when
    /// none exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the snapshot exists but cannot be loaded.
    pub async fn recover(repo: LedgerRepo) -> Result<Self> {
        let state = match repo.load().await? {
            Some(state) => state,
            None => LedgerState::new(Utc::now()),
        };
        Ok(Self {
            state: Mutex::new(state),
            repo,
        })
    }

    /// Credit tokens to a contributor. Always succeeds: unknown authors
    /// get a record created on first credit.
    pub async fn credit(&self, author_id: &str, display_name: &str, amount: u64, kind: RewardKind) {
        self.credit_at(Utc::now(), author_id, display_name, amount, kind)
            .await;
    }

    /// Credit tokens at an explicit instant. Drives rotation from `now`.
    pub async fn credit_at(
        &self,
        now: DateTime<Utc>,
        author_id: &str,
        display_name: &str,
        amount: u64,
        kind: RewardKind,
    ) {
        let mut state = self.state.lock().await;
        rotate_if_needed(&mut state, now);

        let idx = match state
            .contributors
            .iter()
            .position(|c| c.author_id == author_id)
        {
            Some(idx) => idx,
            None => {
                state.contributors.push(ContributorRecord {
                    author_id: author_id.to_owned(),
                    display_name: display_name.to_owned(),
                    total_credits: 0,
                    contributions: Vec::new(),
                });
                state.contributors.len() - 1
            }
        };
        let record = &mut state.contributors[idx];

        record.display_name = display_name.to_owned();
        record.total_credits += amount;
        record.contributions.push(Contribution {
            kind,
            amount,
            timestamp: now,
        });

        info!(author_id, amount, ?kind, "reward credited");
        self.persist(&state).await;
    }

    /// Current-week leaderboard, descending by total credits, ties broken
    /// by first-seen order.
    pub async fn leaderboard(&self) -> Vec<LeaderboardRow> {
        self.leaderboard_at(Utc::now()).await
    }

    /// Leaderboard at an explicit instant. Drives rotation from `now`.
    pub async fn leaderboard_at(&self, now: DateTime<Utc>) -> Vec<LeaderboardRow> {
        let mut state = self.state.lock().await;
        if rotate_if_needed(&mut state, now) {
            self.persist(&state).await;
        }

        let mut rows: Vec<LeaderboardRow> = state
            .contributors
            .iter()
            .map(|c| LeaderboardRow {
                author_id: c.author_id.clone(),
                display_name: c.display_name.clone(),
                total_credits: c.total_credits,
                contribution_count: c.contributions.len(),
            })
            .collect();

        // Stable sort keeps first-seen order for equal totals.
        rows.sort_by(|a, b| b.total_credits.cmp(&a.total_credits));
        rows
    }

    /// Archived prior weeks, oldest first. Applies rotation first.
    pub async fn history_at(&self, now: DateTime<Utc>) -> Vec<WeekArchive> {
        let mut state = self.state.lock().await;
        if rotate_if_needed(&mut state, now) {
            self.persist(&state).await;
        }
        state.history.clone()
    }

    /// Persist the snapshot. Failures are logged, not propagated: the
    /// in-memory state stays authoritative for the process lifetime.
    async fn persist(&self, state: &LedgerState) {
        if let Err(err) = self.repo.save(state).await {
            error!(%err, "failed to persist reward ledger; in-memory state remains authoritative");
        }
    }
}

/// Archive the current bucket and start fresh when the computed week
/// start has advanced past the stored one. Returns whether a rotation
/// happened. A backwards clock step never rotates.
fn rotate_if_needed(state: &mut LedgerState, now: DateTime<Utc>) -> bool {
    let current = week_start(now);
    if current <= state.week_start {
        return false;
    }

    if !state.contributors.is_empty() {
        let archived = WeekArchive {
            week_start: state.week_start,
            contributors: std::mem::take(&mut state.contributors),
        };
        info!(
            week_start = %archived.week_start,
            contributors = archived.contributors.len(),
            "rotating reward ledger week"
        );
        state.history.push(archived);
    }

    state.week_start = current;
    true
}
