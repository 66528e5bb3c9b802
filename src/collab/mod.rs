//! External collaborator abstractions.
//!
//! The workflow core never talks to a chat surface, an AI backend, or a
//! role directory directly. All of those are reached through the traits in
//! this module, so the engine can be driven by a real bot host in
//! production and by recording fakes in tests. All operator-facing wiring
//! routes through these traits.

pub mod default_impls;

use std::future::Future;
use std::pin::Pin;

use crate::models::ticket::{Ticket, TicketKind, TicketPayload};
use crate::review::verb::ApprovalTier;
use crate::Result;

/// Capability checked by the [`Authorizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// May submit change requests.
    Submit,
    /// May apply privileged reviewer verbs.
    Review,
}

/// Turns unstructured submission text into a structured ticket payload.
pub trait Refiner: Send + Sync {
    /// Produce a normalized payload for a raw submission.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Refinement`](crate::AppError::Refinement) if the
    /// backend cannot produce a payload; no ticket is published in that case.
    fn refine(
        &self,
        kind: TicketKind,
        raw_text: &str,
        author_id: &str,
        target_app: &str,
    ) -> Pin<Box<dyn Future<Output = Result<TicketPayload>> + Send + '_>>;
}

/// Produces a code change from an approved ticket.
pub trait CodeGenerator: Send + Sync {
    /// Generate a code-review artifact for the ticket at the given tier.
    ///
    /// Returns a reference to the produced artifact (e.g. a branch or
    /// review URL) on success.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeGen`](crate::AppError::CodeGen) on backend
    /// failure. The caller reports the failure verbatim and does not retry.
    fn generate(
        &self,
        ticket: &Ticket,
        tier: ApprovalTier,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}

/// One-way notification sinks. Failures are logged by callers, never fatal.
pub trait Notifier: Send + Sync {
    /// Publish a new ticket for review and return the identifier of the
    /// message it is attached to. That identifier becomes the ticket handle.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Notify`](crate::AppError::Notify) if the ticket
    /// could not be published; intake creates no ticket in that case.
    fn publish_ticket(
        &self,
        kind: TicketKind,
        target_app: &str,
        title: &str,
        author_name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Send a direct message to a contributor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Notify`](crate::AppError::Notify) on sink failure.
    fn notify_author(
        &self,
        author_id: &str,
        message: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Post a message to a channel.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Notify`](crate::AppError::Notify) on sink failure.
    fn notify_channel(
        &self,
        channel_id: &str,
        message: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Role/eligibility predicate.
pub trait Authorizer: Send + Sync {
    /// Whether the user holds the given capability.
    fn is_authorized(
        &self,
        user_id: &str,
        capability: Capability,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}
