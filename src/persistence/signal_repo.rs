//! Completion signal repository for `SQLite` persistence.
//!
//! The `completion_signal` table is the durable handoff point between the
//! external build worker (producer) and the completion intake poller
//! (consumer). Rows are deleted after handling, giving at-most-once
//! consumption per signal instance.

use std::sync::Arc;

use chrono::Utc;

use crate::models::signal::{CompletionSignal, SignalKind};
use crate::{AppError, Result};

use super::db::Database;

/// Repository for completion signal records.
#[derive(Clone)]
pub struct SignalRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct SignalRow {
    id: String,
    kind: String,
    app: Option<String>,
    handle: Option<String>,
    recipient: Option<String>,
    message: String,
    created_at: String,
}

impl SignalRow {
    fn into_signal(self) -> Result<CompletionSignal> {
        let kind = parse_kind(&self.kind)?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(CompletionSignal {
            id: self.id,
            kind,
            app: self.app,
            handle: self.handle,
            recipient: self.recipient,
            message: self.message,
            created_at,
        })
    }
}

fn parse_kind(s: &str) -> Result<SignalKind> {
    match s {
        "build_ready" => Ok(SignalKind::BuildReady),
        "bug_fixed" => Ok(SignalKind::BugFixed),
        "feature_added" => Ok(SignalKind::FeatureAdded),
        "app_created" => Ok(SignalKind::AppCreated),
        other => Err(AppError::Db(format!("invalid signal kind: {other}"))),
    }
}

fn kind_str(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::BuildReady => "build_ready",
        SignalKind::BugFixed => "bug_fixed",
        SignalKind::FeatureAdded => "feature_added",
        SignalKind::AppCreated => "app_created",
    }
}

impl SignalRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new completion signal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn insert(&self, signal: &CompletionSignal) -> Result<CompletionSignal> {
        let kind = kind_str(signal.kind);
        let created_at = signal.created_at.to_rfc3339();

        sqlx::query(
            "INSERT INTO completion_signal (id, kind, app, handle, recipient, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&signal.id)
        .bind(kind)
        .bind(&signal.app)
        .bind(&signal.handle)
        .bind(&signal.recipient)
        .bind(&signal.message)
        .bind(&created_at)
        .execute(self.db.as_ref())
        .await?;

        Ok(signal.clone())
    }

    /// Fetch all unprocessed signals, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn fetch_all(&self) -> Result<Vec<CompletionSignal>> {
        let rows: Vec<SignalRow> =
            sqlx::query_as("SELECT * FROM completion_signal ORDER BY created_at ASC")
                .fetch_all(self.db.as_ref())
                .await?;

        rows.into_iter().map(SignalRow::into_signal).collect()
    }

    /// Delete a processed signal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM completion_signal WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        Ok(())
    }
}
