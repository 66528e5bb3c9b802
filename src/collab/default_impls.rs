//! In-process collaborator implementations.
//!
//! Used when no external bot host or AI backend is wired in: the
//! authorizer reads the config lists, the refiner applies local
//! heuristics, and the notifier logs through `tracing`. Equivalent to
//! running the server in local-only mode.

use std::future::Future;
use std::pin::Pin;

use tracing::info;
use uuid::Uuid;

use crate::config::GlobalConfig;
use crate::models::ticket::{Priority, TicketKind, TicketPayload};
use crate::{AppError, Result};

use super::{Authorizer, Capability, Notifier, Refiner};

const TITLE_MAX_CHARS: usize = 80;

/// Authorizer backed by the config's reviewer and submitter lists.
pub struct StaticAuthorizer {
    reviewers: Vec<String>,
    submitters: Vec<String>,
}

impl StaticAuthorizer {
    /// Build an authorizer from the global config.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            reviewers: config.reviewer_user_ids.clone(),
            submitters: config.submitter_user_ids.clone(),
        }
    }
}

impl Authorizer for StaticAuthorizer {
    fn is_authorized(
        &self,
        user_id: &str,
        capability: Capability,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let allowed = match capability {
            Capability::Review => self.reviewers.iter().any(|id| id == user_id),
            // An empty submitter list means submissions are open to all.
            Capability::Submit => {
                self.submitters.is_empty() || self.submitters.iter().any(|id| id == user_id)
            }
        };
        Box::pin(std::future::ready(allowed))
    }
}

/// Refiner that structures a submission with local text heuristics.
pub struct HeuristicRefiner;

impl Refiner for HeuristicRefiner {
    fn refine(
        &self,
        kind: TicketKind,
        raw_text: &str,
        _author_id: &str,
        _target_app: &str,
    ) -> Pin<Box<dyn Future<Output = Result<TicketPayload>> + Send + '_>> {
        let text = raw_text.trim().to_owned();
        Box::pin(async move {
            let first_line = text.lines().next().unwrap_or_default().trim();
            if first_line.is_empty() {
                return Err(AppError::Refinement("submission has no content".into()));
            }

            let title: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
            let priority = match kind {
                TicketKind::Feature => None,
                TicketKind::Bug => Some(classify_priority(&text)),
            };

            Ok(TicketPayload {
                title,
                description: text,
                priority,
            })
        })
    }
}

fn classify_priority(text: &str) -> Priority {
    let lower = text.to_lowercase();
    if ["crash", "data loss", "cannot log in", "security"]
        .iter()
        .any(|w| lower.contains(w))
    {
        Priority::High
    } else if ["typo", "cosmetic", "minor"].iter().any(|w| lower.contains(w)) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Notifier that writes every notification to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn publish_ticket(
        &self,
        kind: TicketKind,
        target_app: &str,
        title: &str,
        author_name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let handle = format!("msg:{}", Uuid::new_v4());
        info!(
            ?kind,
            target_app, title, author_name, handle, "new ticket published for review"
        );
        Box::pin(std::future::ready(Ok(handle)))
    }

    fn notify_author(
        &self,
        author_id: &str,
        message: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        info!(author_id, message, "author notification");
        Box::pin(std::future::ready(Ok(())))
    }

    fn notify_channel(
        &self,
        channel_id: &str,
        message: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        info!(channel_id, message, "channel notification");
        Box::pin(std::future::ready(Ok(())))
    }
}
