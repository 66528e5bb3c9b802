//! Ticket repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::Utc;

use crate::models::ticket::{Priority, RewardKind, Ticket, TicketKind, TicketStatus};
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for ticket records.
#[derive(Clone)]
pub struct TicketRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TicketRow {
    handle: String,
    kind: String,
    target_app: String,
    title: String,
    description: String,
    priority: Option<String>,
    author_id: String,
    author_name: String,
    channel_id: String,
    status: String,
    approval_rewarded: i64,
    ship_rewarded: i64,
    created_at: String,
    updated_at: String,
}

impl TicketRow {
    /// Convert a database row into the domain model.
    fn into_ticket(self) -> Result<Ticket> {
        let kind = parse_kind(&self.kind)?;
        let status = parse_status(&self.status)?;
        let priority = self.priority.as_deref().map(parse_priority).transpose()?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);
        let updated_at = chrono::DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| AppError::Db(format!("invalid updated_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Ticket {
            handle: self.handle,
            kind,
            target_app: self.target_app,
            title: self.title,
            description: self.description,
            priority,
            author_id: self.author_id,
            author_name: self.author_name,
            channel_id: self.channel_id,
            status,
            approval_rewarded: self.approval_rewarded != 0,
            ship_rewarded: self.ship_rewarded != 0,
            created_at,
            updated_at,
        })
    }
}

fn parse_kind(s: &str) -> Result<TicketKind> {
    match s {
        "bug" => Ok(TicketKind::Bug),
        "feature" => Ok(TicketKind::Feature),
        other => Err(AppError::Db(format!("invalid ticket kind: {other}"))),
    }
}

fn kind_str(kind: TicketKind) -> &'static str {
    match kind {
        TicketKind::Bug => "bug",
        TicketKind::Feature => "feature",
    }
}

fn parse_priority(s: &str) -> Result<Priority> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(AppError::Db(format!("invalid priority: {other}"))),
    }
}

fn priority_str(p: Priority) -> &'static str {
    match p {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_status(s: &str) -> Result<TicketStatus> {
    match s {
        "pending" => Ok(TicketStatus::Pending),
        "queued" => Ok(TicketStatus::Queued),
        "building" => Ok(TicketStatus::Building),
        "approved" => Ok(TicketStatus::Approved),
        "shipped" => Ok(TicketStatus::Shipped),
        "rejected" => Ok(TicketStatus::Rejected),
        "needs_info" => Ok(TicketStatus::NeedsInfo),
        "backlog" => Ok(TicketStatus::Backlog),
        other => Err(AppError::Db(format!("invalid ticket status: {other}"))),
    }
}

fn status_str(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Pending => "pending",
        TicketStatus::Queued => "queued",
        TicketStatus::Building => "building",
        TicketStatus::Approved => "approved",
        TicketStatus::Shipped => "shipped",
        TicketStatus::Rejected => "rejected",
        TicketStatus::NeedsInfo => "needs_info",
        TicketStatus::Backlog => "backlog",
    }
}

impl TicketRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new ticket record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, ticket: &Ticket) -> Result<Ticket> {
        let kind = kind_str(ticket.kind);
        let status = status_str(ticket.status);
        let priority = ticket.priority.map(priority_str);
        let created_at = ticket.created_at.to_rfc3339();
        let updated_at = ticket.updated_at.to_rfc3339();

        sqlx::query(
            "INSERT INTO ticket (handle, kind, target_app, title, description, priority,
             author_id, author_name, channel_id, status, approval_rewarded, ship_rewarded,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&ticket.handle)
        .bind(kind)
        .bind(&ticket.target_app)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(priority)
        .bind(&ticket.author_id)
        .bind(&ticket.author_name)
        .bind(&ticket.channel_id)
        .bind(status)
        .bind(i64::from(ticket.approval_rewarded))
        .bind(i64::from(ticket.ship_rewarded))
        .bind(&created_at)
        .bind(&updated_at)
        .execute(self.db.as_ref())
        .await?;

        Ok(ticket.clone())
    }

    /// Retrieve a ticket by handle.
    ///
    /// Returns `Ok(None)` if the ticket does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get(&self, handle: &str) -> Result<Option<Ticket>> {
        let row: Option<TicketRow> = sqlx::query_as("SELECT * FROM ticket WHERE handle = ?1")
            .bind(handle)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(TicketRow::into_ticket).transpose()
    }

    /// Retrieve a ticket by handle, failing when it is missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no ticket has this handle, or
    /// `AppError::Db` if the query fails.
    pub async fn require(&self, handle: &str) -> Result<Ticket> {
        self.get(handle)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket {handle} not found")))
    }

    /// Update the status of a ticket.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn update_status(&self, handle: &str, status: TicketStatus) -> Result<()> {
        let status_s = status_str(status);
        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE ticket SET status = ?1, updated_at = ?2 WHERE handle = ?3")
            .bind(status_s)
            .bind(&now)
            .bind(handle)
            .execute(self.db.as_ref())
            .await?;

        Ok(())
    }

    /// Set a reward-granted flag on a ticket.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn set_reward_granted(&self, handle: &str, kind: RewardKind) -> Result<()> {
        let column = match kind {
            RewardKind::Approval => "approval_rewarded",
            RewardKind::ShipBonus => "ship_rewarded",
        };
        let now = Utc::now().to_rfc3339();

        sqlx::query(&format!(
            "UPDATE ticket SET {column} = 1, updated_at = ?1 WHERE handle = ?2"
        ))
        .bind(&now)
        .bind(handle)
        .execute(self.db.as_ref())
        .await?;

        Ok(())
    }

    /// List all tickets with the given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        let status_s = status_str(status);
        let rows: Vec<TicketRow> =
            sqlx::query_as("SELECT * FROM ticket WHERE status = ?1 ORDER BY created_at ASC")
                .bind(status_s)
                .fetch_all(self.db.as_ref())
                .await?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }
}
