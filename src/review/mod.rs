//! Review state machine.
//!
//! Applies reviewer verbs to tickets per the transition table:
//!
//! | From       | Verb                         | To                     |
//! |------------|------------------------------|------------------------|
//! | reviewable | approve / approve_high_tier  | approved               |
//! | reviewable | manual                       | unchanged              |
//! | reviewable | send_to_build                | building or queued     |
//! | reviewable | todo                         | backlog                |
//! | reviewable | needs_info                   | needs_info             |
//! | reviewable | reject                       | rejected (terminal)    |
//! | approved   | ship                         | shipped (terminal)     |
//!
//! "Reviewable" covers `pending`, `needs_info`, and `backlog` — the latter
//! two are re-reviewable in place. Rewards are credited at most once per
//! ticket and type, guarded by the ticket's granted flags, so a duplicate
//! reviewer reaction re-triggering a transition cannot double-pay.

pub mod verb;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::collab::{Authorizer, Capability, CodeGenerator, Notifier};
use crate::config::GlobalConfig;
use crate::ledger::RewardLedger;
use crate::models::queue::QueueEntry;
use crate::models::ticket::{RewardKind, Ticket, TicketStatus};
use crate::persistence::prompt_repo::{BuildPrompt, PromptRepo};
use crate::persistence::ticket_repo::TicketRepo;
use crate::queue::{BuildQueue, HandOff};
use crate::{AppError, Result};

use verb::{ApprovalTier, ReviewVerb};

/// Consumes reviewer actions and performs the associated transitions.
pub struct ReviewEngine {
    config: Arc<GlobalConfig>,
    tickets: TicketRepo,
    prompts: PromptRepo,
    queue: Arc<BuildQueue>,
    ledger: Arc<RewardLedger>,
    codegen: Arc<dyn CodeGenerator>,
    notifier: Arc<dyn Notifier>,
    authorizer: Arc<dyn Authorizer>,
}

impl ReviewEngine {
    /// Build a review engine over the given stores and collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)] // Constructor wires every seam once at startup.
    pub fn new(
        config: Arc<GlobalConfig>,
        tickets: TicketRepo,
        prompts: PromptRepo,
        queue: Arc<BuildQueue>,
        ledger: Arc<RewardLedger>,
        codegen: Arc<dyn CodeGenerator>,
        notifier: Arc<dyn Notifier>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            config,
            tickets,
            prompts,
            queue,
            ledger,
            codegen,
            notifier,
            authorizer,
        }
    }

    /// Apply one reviewer verb to the ticket with the given handle.
    ///
    /// Reviewer actions on the same ticket must be applied in the order
    /// they are observed; the host layer is responsible for that
    /// serialization (and for reverting the triggering reaction when this
    /// returns `Unauthorized`).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown handle, `Unauthorized` when the
    /// verb needs reviewer privilege the caller lacks, and
    /// `InvalidTransition` when the verb does not apply to the ticket's
    /// current status. Code-generation failures do not surface here; they
    /// are reported to reviewers and leave the ticket `approved`.
    pub async fn apply(&self, handle: &str, verb: ReviewVerb, reviewer_id: &str) -> Result<()> {
        let ticket = self.tickets.require(handle).await?;

        if verb.requires_reviewer()
            && !self
                .authorizer
                .is_authorized(reviewer_id, Capability::Review)
                .await
        {
            warn!(handle, %verb, reviewer_id, "non-reviewer attempted privileged verb");
            return Err(AppError::Unauthorized(format!(
                "{verb} requires reviewer privilege"
            )));
        }

        self.check_transition(&ticket, verb)?;
        info!(handle, %verb, reviewer_id, status = ?ticket.status, "applying reviewer verb");

        match verb {
            ReviewVerb::Approve => self.approve(ticket, ApprovalTier::Standard).await,
            ReviewVerb::ApproveHighTier => self.approve(ticket, ApprovalTier::High).await,
            ReviewVerb::Manual => self.manual(ticket).await,
            ReviewVerb::SendToBuild => self.send_to_build(ticket).await,
            ReviewVerb::Todo => self.todo(ticket).await,
            ReviewVerb::NeedsInfo => self.needs_info(ticket).await,
            ReviewVerb::Reject => self.reject(ticket).await,
            ReviewVerb::Ship => self.ship(ticket).await,
        }
    }

    /// Validate the verb against the ticket's current status.
    fn check_transition(&self, ticket: &Ticket, verb: ReviewVerb) -> Result<()> {
        let valid = match verb {
            ReviewVerb::Ship => ticket.status == TicketStatus::Approved,
            _ => ticket.status.is_reviewable(),
        };
        if valid {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "{verb} does not apply to ticket {} in status {:?}",
                ticket.handle, ticket.status
            )))
        }
    }

    /// `approve` / `approve_high_tier`: transition, credit, then generate.
    ///
    /// The status change and reward are committed before the
    /// code-generation call, which runs without any lock held. A
    /// generation failure is reported verbatim and not retried; the
    /// ticket stays `approved`.
    async fn approve(&self, ticket: Ticket, tier: ApprovalTier) -> Result<()> {
        self.tickets
            .update_status(&ticket.handle, TicketStatus::Approved)
            .await?;
        self.grant_reward(&ticket, RewardKind::Approval).await;

        match self.codegen.generate(&ticket, tier).await {
            Ok(artifact) => {
                self.post_to_review_channel(&format!(
                    "Code review artifact ready for `{}` ({}): {artifact}",
                    ticket.handle, ticket.title
                ))
                .await;
            }
            Err(err) => {
                self.post_to_review_channel(&format!(
                    "Code generation failed for `{}` ({}): {err}",
                    ticket.handle, ticket.title
                ))
                .await;
            }
        }
        Ok(())
    }

    /// `manual`: persist a build-ready prompt; ticket state unchanged.
    async fn manual(&self, ticket: Ticket) -> Result<()> {
        let prompt = BuildPrompt::new(ticket.handle.clone(), render_build_prompt(&ticket));
        self.prompts.insert(&prompt).await?;

        self.dm_author(
            &ticket,
            &format!(
                "A build-ready prompt for \"{}\" was prepared for manual pickup.",
                ticket.title
            ),
        )
        .await;
        Ok(())
    }

    /// `send_to_build`: dispatch immediately when the worker is idle,
    /// otherwise join the FIFO tail.
    async fn send_to_build(&self, ticket: Ticket) -> Result<()> {
        let entry = QueueEntry {
            handle: ticket.handle.clone(),
            title: ticket.title.clone(),
            app: ticket.target_app.clone(),
            enqueued_at: Utc::now(),
        };

        match self.queue.hand_off(entry).await {
            HandOff::Started => {
                self.tickets
                    .update_status(&ticket.handle, TicketStatus::Building)
                    .await?;
                self.dm_author(
                    &ticket,
                    &format!("Your request \"{}\" is now being built.", ticket.title),
                )
                .await;
            }
            HandOff::Queued(position) => {
                self.tickets
                    .update_status(&ticket.handle, TicketStatus::Queued)
                    .await?;
                self.dm_author(
                    &ticket,
                    &format!(
                        "Your request \"{}\" is queued for build at position {position}.",
                        ticket.title
                    ),
                )
                .await;
            }
        }
        Ok(())
    }

    /// `todo`: park in the backlog; the ticket stays visible.
    async fn todo(&self, ticket: Ticket) -> Result<()> {
        self.tickets
            .update_status(&ticket.handle, TicketStatus::Backlog)
            .await?;
        Ok(())
    }

    /// `needs_info`: ask the author for detail in the original channel.
    async fn needs_info(&self, ticket: Ticket) -> Result<()> {
        self.tickets
            .update_status(&ticket.handle, TicketStatus::NeedsInfo)
            .await?;

        let message = format!(
            "<@{}> your request \"{}\" needs more detail before review can continue.",
            ticket.author_id, ticket.title
        );
        if let Err(err) = self
            .notifier
            .notify_channel(&ticket.channel_id, &message)
            .await
        {
            warn!(%err, handle = %ticket.handle, "needs-info channel notification failed");
        }
        Ok(())
    }

    /// `reject`: terminal.
    async fn reject(&self, ticket: Ticket) -> Result<()> {
        self.tickets
            .update_status(&ticket.handle, TicketStatus::Rejected)
            .await?;
        self.dm_author(
            &ticket,
            &format!("Your request \"{}\" was rejected by a reviewer.", ticket.title),
        )
        .await;
        Ok(())
    }

    /// `ship`: credit the ship bonus once; terminal.
    async fn ship(&self, ticket: Ticket) -> Result<()> {
        self.tickets
            .update_status(&ticket.handle, TicketStatus::Shipped)
            .await?;
        self.grant_reward(&ticket, RewardKind::ShipBonus).await;
        self.dm_author(
            &ticket,
            &format!("Your request \"{}\" has shipped.", ticket.title),
        )
        .await;
        Ok(())
    }

    /// Credit a reward at most once per ticket and type.
    ///
    /// The granted flag is checked before crediting and set immediately
    /// after, so a duplicate reaction re-triggering the same transition
    /// handler is a no-op rather than a double payment.
    async fn grant_reward(&self, ticket: &Ticket, kind: RewardKind) {
        if ticket.reward_granted(kind) {
            info!(handle = %ticket.handle, ?kind, "reward already granted; skipping");
            return;
        }

        let amount = self.config.reward_amount(kind);
        self.ledger
            .credit(&ticket.author_id, &ticket.author_name, amount, kind)
            .await;
        if let Err(err) = self.tickets.set_reward_granted(&ticket.handle, kind).await {
            warn!(%err, handle = %ticket.handle, ?kind, "failed to persist reward-granted flag");
        }
    }

    /// Post to the review channel, logging failures.
    async fn post_to_review_channel(&self, message: &str) {
        if let Err(err) = self
            .notifier
            .notify_channel(&self.config.review_channel_id, message)
            .await
        {
            warn!(%err, "review channel notification failed");
        }
    }

    /// Direct-message the ticket author, logging failures.
    async fn dm_author(&self, ticket: &Ticket, message: &str) {
        if let Err(err) = self.notifier.notify_author(&ticket.author_id, message).await {
            warn!(%err, handle = %ticket.handle, "author notification failed");
        }
    }
}

/// Render the out-of-band build prompt for the `manual` verb.
fn render_build_prompt(ticket: &Ticket) -> String {
    let mut prompt = format!(
        "App: {}\nKind: {:?}\nTitle: {}\n\n{}",
        ticket.target_app, ticket.kind, ticket.title, ticket.description
    );
    if let Some(priority) = ticket.priority {
        prompt.push_str(&format!("\n\nPriority: {priority:?}"));
    }
    prompt
}
