//! Reviewer verbs and approval tiers.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Code-generation tier selected by the approval verb.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalTier {
    /// Standard generation.
    Standard,
    /// High-capability generation for harder changes.
    High,
}

/// One of the recognized review actions.
///
/// The host layer maps its event vocabulary (reactions, buttons, slash
/// commands) onto these verbs; the state machine dispatches on the enum,
/// not on raw event identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerb {
    /// Approve and generate code at the standard tier.
    Approve,
    /// Approve and generate code at the high tier.
    ApproveHighTier,
    /// Write a build-ready prompt for out-of-band pickup; no state change.
    Manual,
    /// Hand the ticket to the build worker (immediately or via the queue).
    SendToBuild,
    /// Park the ticket in the backlog.
    Todo,
    /// Ask the author for more detail.
    NeedsInfo,
    /// Reject the ticket. Terminal.
    Reject,
    /// Mark the approved artifact as shipped. Terminal.
    Ship,
}

impl ReviewVerb {
    /// Parse a host-layer action identifier.
    #[must_use]
    pub fn parse(action_id: &str) -> Option<Self> {
        match action_id {
            "approve" => Some(Self::Approve),
            "approve_high_tier" => Some(Self::ApproveHighTier),
            "manual" => Some(Self::Manual),
            "send_to_build" => Some(Self::SendToBuild),
            "todo" => Some(Self::Todo),
            "needs_info" => Some(Self::NeedsInfo),
            "reject" => Some(Self::Reject),
            "ship" => Some(Self::Ship),
            _ => None,
        }
    }

    /// Stable identifier for logs and host-layer round trips.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::ApproveHighTier => "approve_high_tier",
            Self::Manual => "manual",
            Self::SendToBuild => "send_to_build",
            Self::Todo => "todo",
            Self::NeedsInfo => "needs_info",
            Self::Reject => "reject",
            Self::Ship => "ship",
        }
    }

    /// Whether the verb requires reviewer privilege.
    ///
    /// `todo` and `needs_info` are open to anyone; everything else is
    /// reviewer-only.
    #[must_use]
    pub fn requires_reviewer(self) -> bool {
        !matches!(self, Self::Todo | Self::NeedsInfo)
    }
}

impl Display for ReviewVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
