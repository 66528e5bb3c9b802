//! Build prompt repository for `SQLite` persistence.
//!
//! The `manual` review verb writes a build-ready prompt here for
//! out-of-band pickup (an operator pasting it into an IDE agent). Prompts
//! survive restarts and are marked consumed once picked up.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AppError, Result};

use super::db::Database;

/// A build-ready prompt awaiting out-of-band pickup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPrompt {
    /// Unique record identifier.
    pub id: String,
    /// Handle of the ticket this prompt was rendered from.
    pub handle: String,
    /// Rendered prompt text.
    pub prompt_text: String,
    /// Whether this prompt has been picked up.
    pub consumed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl BuildPrompt {
    /// Construct a new unconsumed prompt with a generated identifier.
    #[must_use]
    pub fn new(handle: String, prompt_text: String) -> Self {
        Self {
            id: format!("prompt:{}", Uuid::new_v4()),
            handle,
            prompt_text,
            consumed: false,
            created_at: Utc::now(),
        }
    }
}

/// Repository for build prompt records.
#[derive(Clone)]
pub struct PromptRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct PromptRow {
    id: String,
    handle: String,
    prompt_text: String,
    consumed: i64,
    created_at: String,
}

impl PromptRow {
    fn into_prompt(self) -> Result<BuildPrompt> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(BuildPrompt {
            id: self.id,
            handle: self.handle,
            prompt_text: self.prompt_text,
            consumed: self.consumed != 0,
            created_at,
        })
    }
}

impl PromptRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new build prompt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn insert(&self, prompt: &BuildPrompt) -> Result<BuildPrompt> {
        let created_at = prompt.created_at.to_rfc3339();

        sqlx::query(
            "INSERT INTO build_prompt (id, handle, prompt_text, consumed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&prompt.id)
        .bind(&prompt.handle)
        .bind(&prompt.prompt_text)
        .bind(i64::from(prompt.consumed))
        .bind(&created_at)
        .execute(self.db.as_ref())
        .await?;

        Ok(prompt.clone())
    }

    /// Fetch all unconsumed prompts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn fetch_unconsumed(&self) -> Result<Vec<BuildPrompt>> {
        let rows: Vec<PromptRow> = sqlx::query_as(
            "SELECT * FROM build_prompt WHERE consumed = 0 ORDER BY created_at ASC",
        )
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(PromptRow::into_prompt).collect()
    }

    /// Mark a prompt as picked up.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn mark_consumed(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE build_prompt SET consumed = 1 WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        Ok(())
    }
}
