//! Submission intake — validation, classification, refinement, publish.
//!
//! Takes a raw request, validates it against the closed app registry and
//! the author's eligibility, classifies bug vs. feature, asks the
//! refinement collaborator for a structured payload, and publishes the
//! resulting ticket for review. Rejections are specific (`TooShort`,
//! `MissingAppTag`, `UnknownApp`, `Unauthorized`, `Refinement`) so the
//! host layer can tell the submitter exactly what failed.

pub mod dedup;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::info;

use crate::collab::{Authorizer, Capability, Notifier, Refiner};
use crate::config::GlobalConfig;
use crate::models::ticket::{Ticket, TicketKind};
use crate::persistence::ticket_repo::TicketRepo;
use crate::{AppError, Result};

use dedup::RecentMessageGuard;

/// Vocabulary suggesting a defect report.
const BUG_WORDS: &[&str] = &[
    "bug", "broken", "crash", "crashes", "crashed", "error", "fail", "fails", "failing", "freeze",
    "freezes", "wrong", "fix", "regression",
];

/// Vocabulary suggesting a feature request.
const FEATURE_WORDS: &[&str] = &[
    "add", "allow", "feature", "improve", "new", "option", "request", "support", "want", "wish",
];

/// Source-message context accompanying a submission.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    /// Identifier of the source message, used for deduplication.
    pub message_id: String,
    /// Channel the submission arrived in.
    pub channel_id: String,
    /// Display name of the submitting human.
    pub author_name: String,
}

/// Validates and publishes raw submissions as pending tickets.
pub struct SubmissionIntake {
    config: Arc<GlobalConfig>,
    tickets: TicketRepo,
    refiner: Arc<dyn Refiner>,
    notifier: Arc<dyn Notifier>,
    authorizer: Arc<dyn Authorizer>,
    dedup: RecentMessageGuard,
    app_tag: Regex,
}

impl SubmissionIntake {
    /// Build an intake component over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the app-tag pattern fails to compile.
    pub fn new(
        config: Arc<GlobalConfig>,
        tickets: TicketRepo,
        refiner: Arc<dyn Refiner>,
        notifier: Arc<dyn Notifier>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self> {
        let app_tag = Regex::new(r"<#([A-Za-z0-9][A-Za-z0-9_-]*)>")
            .map_err(|err| AppError::Config(format!("app tag pattern: {err}")))?;
        let dedup = RecentMessageGuard::new(Duration::from_secs(config.dedup_window_seconds));

        Ok(Self {
            config,
            tickets,
            refiner,
            notifier,
            authorizer,
            dedup,
            app_tag,
        })
    }

    /// Process one raw submission.
    ///
    /// Returns `Ok(None)` when the source message was already processed
    /// within the dedup window — the duplicate is silently absorbed, not
    /// surfaced as an error.
    ///
    /// # Errors
    ///
    /// Returns `TooShort`, `MissingAppTag`, `UnknownApp`, or `Unauthorized`
    /// on validation failure, `Refinement` if the refinement collaborator
    /// fails, and `Notify`/`Db` if publishing or storing the ticket fails.
    /// No ticket exists after any of these.
    pub async fn submit(
        &self,
        raw_text: &str,
        author_id: &str,
        context: &SubmissionContext,
    ) -> Result<Option<Ticket>> {
        if !self.dedup.check_and_record(&context.message_id).await {
            info!(
                message_id = %context.message_id,
                "duplicate submission absorbed"
            );
            return Ok(None);
        }

        let text = raw_text.trim();
        let length = text.chars().count();
        if length < self.config.min_submission_chars {
            return Err(AppError::TooShort(format!(
                "{length} chars, minimum is {}",
                self.config.min_submission_chars
            )));
        }

        let target_app = self.resolve_app_tag(text)?;

        if !self
            .authorizer
            .is_authorized(author_id, Capability::Submit)
            .await
        {
            return Err(AppError::Unauthorized(format!(
                "user {author_id} is not eligible to submit requests"
            )));
        }

        let kind = classify_kind(text);

        let payload = self
            .refiner
            .refine(kind, text, author_id, &target_app)
            .await?;

        let handle = self
            .notifier
            .publish_ticket(kind, &target_app, &payload.title, &context.author_name)
            .await?;

        let ticket = Ticket::new(
            handle,
            kind,
            target_app,
            payload,
            author_id.to_owned(),
            context.author_name.clone(),
            context.channel_id.clone(),
        );
        self.tickets.create(&ticket).await?;

        info!(
            handle = %ticket.handle,
            kind = ?ticket.kind,
            target_app = %ticket.target_app,
            author_id,
            "ticket published for review"
        );

        Ok(Some(ticket))
    }

    /// Extract the single registered app tag a submission references.
    fn resolve_app_tag(&self, text: &str) -> Result<String> {
        let tags: BTreeSet<&str> = self
            .app_tag
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        match tags.len() {
            1 => {}
            0 => {
                return Err(AppError::MissingAppTag(
                    "submission must reference exactly one app tag like <#app-42>".into(),
                ))
            }
            n => {
                return Err(AppError::MissingAppTag(format!(
                    "submission references {n} apps; exactly one is required"
                )))
            }
        }

        // len() == 1 checked above.
        let tag = tags.into_iter().next().unwrap_or_default();
        if self.config.app(tag).is_none() {
            return Err(AppError::UnknownApp(format!(
                "{tag} is not a registered app"
            )));
        }
        Ok(tag.to_owned())
    }
}

/// Classify a submission as bug or feature.
///
/// Explicit `bug:` / `feature:` prefixes win; otherwise keyword heuristics
/// decide, with defect vocabulary checked first and feature as the default.
#[must_use]
pub fn classify_kind(text: &str) -> TicketKind {
    let lower = text.to_lowercase();
    if lower.starts_with("bug:") {
        return TicketKind::Bug;
    }
    if lower.starts_with("feature:") {
        return TicketKind::Feature;
    }

    let tokens: BTreeSet<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let has_bug_vocab = BUG_WORDS.iter().any(|w| tokens.contains(w));
    let has_feature_vocab = FEATURE_WORDS.iter().any(|w| tokens.contains(w));

    // Defect vocabulary wins over desire vocabulary; the default is feature.
    match (has_bug_vocab, has_feature_vocab) {
        (true, _) => TicketKind::Bug,
        (false, _) => TicketKind::Feature,
    }
}
