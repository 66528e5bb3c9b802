//! Reward ledger state — weekly-bucketed token credits per contributor.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::ticket::RewardKind;

/// One credit event inside a contributor's weekly record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contribution {
    /// Action type that earned the credit.
    pub kind: RewardKind,
    /// Token amount, non-negative.
    pub amount: u64,
    /// When the credit was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Per-contributor record within one weekly bucket.
///
/// Invariant: `total_credits` equals the sum of `contributions` amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContributorRecord {
    /// Stable contributor identifier.
    pub author_id: String,
    /// Display name captured at credit time.
    pub display_name: String,
    /// Running sum of this week's contribution amounts.
    pub total_credits: u64,
    /// Individual credit events, in order of arrival.
    pub contributions: Vec<Contribution>,
}

/// An archived weekly bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekArchive {
    /// Start of the archived calendar week.
    pub week_start: DateTime<Utc>,
    /// Contributor records as they stood at rotation.
    pub contributors: Vec<ContributorRecord>,
}

/// Whole ledger state, persisted as a single snapshot.
///
/// `contributors` preserves first-seen order, which is the tie-break order
/// for the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerState {
    /// Start of the current calendar week.
    pub week_start: DateTime<Utc>,
    /// Current-week contributor records in first-seen order.
    pub contributors: Vec<ContributorRecord>,
    /// Archived prior weeks, oldest first.
    pub history: Vec<WeekArchive>,
}

impl LedgerState {
    /// Fresh ledger for the week containing `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            week_start: week_start(now),
            contributors: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// One leaderboard row, ordered by total credits descending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// Stable contributor identifier.
    pub author_id: String,
    /// Display name captured at credit time.
    pub display_name: String,
    /// This week's total token credits.
    pub total_credits: u64,
    /// Number of credit events this week.
    pub contribution_count: usize,
}

/// Start of the calendar week (Monday 00:00 UTC) containing `now`.
#[must_use]
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .week(Weekday::Mon)
        .first_day()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
