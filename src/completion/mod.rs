//! Completion intake — polls for asynchronous build-worker signals.
//!
//! The external build worker drops [`CompletionSignal`] rows into the
//! `completion_signal` table. `poll_once` drains them oldest-first:
//! each signal triggers its notifications, advances the build queue when
//! it confirms the current build, and is then deleted from the source.
//! A crash between processing and deletion can duplicate a notification;
//! that is an accepted, documented risk.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::collab::Notifier;
use crate::config::GlobalConfig;
use crate::models::signal::{CompletionSignal, SignalKind};
use crate::models::ticket::TicketStatus;
use crate::persistence::signal_repo::SignalRepo;
use crate::persistence::ticket_repo::TicketRepo;
use crate::queue::BuildQueue;
use crate::Result;

/// Consumes completion signals and feeds them back into notifications
/// and queue advancement.
pub struct CompletionIntake {
    config: Arc<GlobalConfig>,
    signals: SignalRepo,
    tickets: TicketRepo,
    queue: Arc<BuildQueue>,
    notifier: Arc<dyn Notifier>,
}

impl CompletionIntake {
    /// Build a completion intake over the given stores and notifier.
    #[must_use]
    pub fn new(
        config: Arc<GlobalConfig>,
        signals: SignalRepo,
        tickets: TicketRepo,
        queue: Arc<BuildQueue>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            signals,
            tickets,
            queue,
            notifier,
        }
    }

    /// Process all pending completion signals, oldest first.
    ///
    /// Returns the number of signals handled.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the signal source cannot be read. A
    /// failure while handling one signal is logged and that signal is
    /// retried on the next poll; later signals still get processed.
    pub async fn poll_once(&self) -> Result<usize> {
        let pending = self.signals.fetch_all().await?;
        let mut handled = 0;

        for signal in pending {
            if let Err(err) = self.handle(&signal).await {
                warn!(%err, id = %signal.id, "completion signal handling failed; will retry");
                continue;
            }
            if let Err(err) = self.signals.delete(&signal.id).await {
                warn!(%err, id = %signal.id, "failed to delete processed signal");
                continue;
            }
            handled += 1;
        }

        Ok(handled)
    }

    /// Route one signal to its notifications and side effects.
    async fn handle(&self, signal: &CompletionSignal) -> Result<()> {
        info!(id = %signal.id, kind = ?signal.kind, "processing completion signal");

        match signal.kind {
            SignalKind::BuildReady => self.handle_build_ready(signal).await,
            SignalKind::BugFixed | SignalKind::FeatureAdded => {
                self.dm_recipient(signal).await;
                self.post_channel(&format!(
                    "{}: {}",
                    describe_kind(signal.kind),
                    signal.message
                ))
                .await;
                Ok(())
            }
            SignalKind::AppCreated => {
                self.post_channel(&format!("New app created: {}", signal.message))
                    .await;
                Ok(())
            }
        }
    }

    /// `build_ready`: the current build's artifact is live.
    ///
    /// Confirms the in-flight build, then dispatches the next queued
    /// entry (if any) and marks its ticket `building`. The finished
    /// ticket's status is whatever the review state machine recorded;
    /// this intake only triggers the notify-on-deploy side effects.
    async fn handle_build_ready(&self, signal: &CompletionSignal) -> Result<()> {
        if let Some(handle) = &signal.handle {
            if let Some(ticket) = self.tickets.get(handle).await? {
                let message = format!("Your build for \"{}\" is live: {}", ticket.title, signal.message);
                if let Err(err) = self.notifier.notify_author(&ticket.author_id, &message).await {
                    warn!(%err, handle = %ticket.handle, "deploy notification failed");
                }
            }
        }
        self.dm_recipient(signal).await;
        self.post_channel(&format!("Build ready: {}", signal.message))
            .await;

        let current_matches = match (&signal.handle, self.queue.current_handle().await) {
            (Some(handle), Some(current)) => *handle == current,
            _ => false,
        };

        if current_matches {
            self.queue.complete().await;
            if let Some(next) = self.queue.dispatch().await {
                self.tickets
                    .update_status(&next.handle, TicketStatus::Building)
                    .await?;
                if let Some(ticket) = self.tickets.get(&next.handle).await? {
                    let message =
                        format!("Your request \"{}\" is now being built.", ticket.title);
                    if let Err(err) =
                        self.notifier.notify_author(&ticket.author_id, &message).await
                    {
                        warn!(%err, handle = %next.handle, "build-start notification failed");
                    }
                }
            }
        }

        Ok(())
    }

    /// Direct-message the signal's named recipient, if any.
    async fn dm_recipient(&self, signal: &CompletionSignal) {
        if let Some(recipient) = &signal.recipient {
            if let Err(err) = self.notifier.notify_author(recipient, &signal.message).await {
                warn!(%err, recipient, "recipient notification failed");
            }
        }
    }

    /// Post to the review channel, logging failures.
    async fn post_channel(&self, message: &str) {
        if let Err(err) = self
            .notifier
            .notify_channel(&self.config.review_channel_id, message)
            .await
        {
            warn!(%err, "completion channel notification failed");
        }
    }
}

fn describe_kind(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::BuildReady => "Build ready",
        SignalKind::BugFixed => "Bug fixed",
        SignalKind::FeatureAdded => "Feature added",
        SignalKind::AppCreated => "App created",
    }
}

/// Spawn the completion polling background task.
///
/// Polls on the configured interval until the `CancellationToken` fires.
#[must_use]
pub fn spawn_poll_task(
    intake: Arc<CompletionIntake>,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("completion poll task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match intake.poll_once().await {
                        Ok(0) => {}
                        Ok(n) => info!(handled = n, "completion signals processed"),
                        Err(err) => error!(%err, "completion poll failed"),
                    }
                }
            }
        }
    })
}
