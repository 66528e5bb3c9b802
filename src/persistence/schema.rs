//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS ticket (
    handle            TEXT PRIMARY KEY NOT NULL,
    kind              TEXT NOT NULL CHECK(kind IN ('bug','feature')),
    target_app        TEXT NOT NULL,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    priority          TEXT CHECK(priority IN ('low','medium','high')),
    author_id         TEXT NOT NULL,
    author_name       TEXT NOT NULL,
    channel_id        TEXT NOT NULL,
    status            TEXT NOT NULL CHECK(status IN ('pending','queued','building','approved','shipped','rejected','needs_info','backlog')),
    approval_rewarded INTEGER NOT NULL DEFAULT 0,
    ship_rewarded     INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS queue_state (
    id              INTEGER PRIMARY KEY CHECK(id = 1),
    state           TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reward_ledger (
    id              INTEGER PRIMARY KEY CHECK(id = 1),
    state           TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS completion_signal (
    id              TEXT PRIMARY KEY NOT NULL,
    kind            TEXT NOT NULL CHECK(kind IN ('build_ready','bug_fixed','feature_added','app_created')),
    app             TEXT,
    handle          TEXT,
    recipient       TEXT,
    message         TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS build_prompt (
    id              TEXT PRIMARY KEY NOT NULL,
    handle          TEXT NOT NULL,
    prompt_text     TEXT NOT NULL,
    consumed        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ticket_status ON ticket(status);
CREATE INDEX IF NOT EXISTS idx_ticket_author ON ticket(author_id);
CREATE INDEX IF NOT EXISTS idx_signal_created ON completion_signal(created_at);
CREATE INDEX IF NOT EXISTS idx_prompt_handle ON build_prompt(handle);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
