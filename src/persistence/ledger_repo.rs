//! Reward ledger repository — singleton whole-state snapshot persistence.

use std::sync::Arc;

use chrono::Utc;

use crate::models::ledger::LedgerState;
use crate::Result;

use super::db::Database;

/// Repository for the reward-ledger singleton row.
#[derive(Clone)]
pub struct LedgerRepo {
    db: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    state: String,
}

impl LedgerRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Load the persisted ledger state, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or the snapshot does not
    /// deserialize.
    pub async fn load(&self) -> Result<Option<LedgerState>> {
        let row: Option<SnapshotRow> =
            sqlx::query_as("SELECT state FROM reward_ledger WHERE id = 1")
                .fetch_optional(self.db.as_ref())
                .await?;

        row.map(|r| serde_json::from_str(&r.state).map_err(Into::into))
            .transpose()
    }

    /// Persist the full ledger state, replacing any prior snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if serialization or the write fails.
    pub async fn save(&self, state: &LedgerState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO reward_ledger (id, state, updated_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET state = ?1, updated_at = ?2",
        )
        .bind(&json)
        .bind(&now)
        .execute(self.db.as_ref())
        .await?;

        Ok(())
    }
}
