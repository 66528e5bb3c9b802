//! Persistence layer modules.

pub mod db;
pub mod ledger_repo;
pub mod prompt_repo;
pub mod queue_repo;
pub mod schema;
pub mod signal_repo;
pub mod ticket_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
