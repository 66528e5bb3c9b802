//! Ticket model — the unit of work moving through review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a submitted change request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Defect report against existing behavior.
    Bug,
    /// Request for new or changed behavior.
    Feature,
}

/// Bug priority produced by refinement. Feature tickets carry none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Cosmetic or rarely-hit defect.
    Low,
    /// Ordinary defect.
    Medium,
    /// Blocking or data-loss defect.
    High,
}

/// Lifecycle status of a ticket.
///
/// `Shipped` and `Rejected` are terminal. `Backlog` and `NeedsInfo` are
/// quasi-terminal: no automatic further transition, but re-reviewable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Awaiting a reviewer verb.
    Pending,
    /// Waiting in the build queue behind the current build.
    Queued,
    /// Being built by the external build worker.
    Building,
    /// Approved; a code-review artifact exists or is being generated.
    Approved,
    /// Artifact landed. Terminal.
    Shipped,
    /// Rejected by a reviewer. Terminal.
    Rejected,
    /// Returned to the author for more detail.
    NeedsInfo,
    /// Parked for later review.
    Backlog,
}

impl TicketStatus {
    /// Whether the status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Shipped | Self::Rejected)
    }

    /// Whether a reviewer verb may be applied from this status.
    ///
    /// `NeedsInfo` and `Backlog` tickets are re-reviewable in place.
    #[must_use]
    pub fn is_reviewable(self) -> bool {
        matches!(self, Self::Pending | Self::NeedsInfo | Self::Backlog)
    }
}

/// Reward types a ticket can grant, each paid at most once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Credited when the ticket is approved.
    Approval,
    /// Credited when the approved artifact ships.
    ShipBonus,
}

/// Structured payload produced by the refinement collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketPayload {
    /// Concise summary of the request.
    pub title: String,
    /// Normalized description.
    pub description: String,
    /// Priority classification (bug tickets only).
    pub priority: Option<Priority>,
}

/// The structured record of a bug/feature request moving through review.
///
/// Never deleted: terminal tickets remain for audit, non-terminal ones
/// remain visible for re-review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Opaque stable identifier, derived from the published message identity.
    pub handle: String,
    /// Bug or feature.
    pub kind: TicketKind,
    /// App tag resolved against the closed registry.
    pub target_app: String,
    /// Concise summary produced by refinement.
    pub title: String,
    /// Normalized description produced by refinement.
    pub description: String,
    /// Priority classification (bug tickets only).
    pub priority: Option<Priority>,
    /// Stable identifier of the submitting human.
    pub author_id: String,
    /// Display name of the submitting human, for ledger rows.
    pub author_name: String,
    /// Channel the submission originated in, for follow-up requests.
    pub channel_id: String,
    /// Current lifecycle status.
    pub status: TicketStatus,
    /// Whether the approval reward has been credited.
    pub approval_rewarded: bool,
    /// Whether the ship bonus has been credited.
    pub ship_rewarded: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Construct a new pending ticket from a refinement payload.
    #[must_use]
    pub fn new(
        handle: String,
        kind: TicketKind,
        target_app: String,
        payload: TicketPayload,
        author_id: String,
        author_name: String,
        channel_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            handle,
            kind,
            target_app,
            title: payload.title,
            description: payload.description,
            priority: payload.priority,
            author_id,
            author_name,
            channel_id,
            status: TicketStatus::Pending,
            approval_rewarded: false,
            ship_rewarded: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given reward type has already been paid.
    #[must_use]
    pub fn reward_granted(&self, kind: RewardKind) -> bool {
        match kind {
            RewardKind::Approval => self.approval_rewarded,
            RewardKind::ShipBonus => self.ship_rewarded,
        }
    }
}
