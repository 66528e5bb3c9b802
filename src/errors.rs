//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Persistence failure when interacting with `SQLite`.
    Db(String),
    /// Submission text is below the minimum length.
    TooShort(String),
    /// Submission does not reference exactly one registered app.
    MissingAppTag(String),
    /// Submission references an app outside the closed registry.
    UnknownApp(String),
    /// Caller is not authorized to perform the requested action.
    Unauthorized(String),
    /// The refinement collaborator failed to produce a ticket payload.
    Refinement(String),
    /// The code-generation collaborator failed.
    CodeGen(String),
    /// Notification sink failure (logged at call sites, never fatal).
    Notify(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// Review verb is not valid from the ticket's current status.
    InvalidTransition(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::TooShort(msg) => write!(f, "submission too short: {msg}"),
            Self::MissingAppTag(msg) => write!(f, "missing app tag: {msg}"),
            Self::UnknownApp(msg) => write!(f, "unknown app: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::Refinement(msg) => write!(f, "refinement failed: {msg}"),
            Self::CodeGen(msg) => write!(f, "code generation failed: {msg}"),
            Self::Notify(msg) => write!(f, "notify: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::InvalidTransition(msg) => write!(f, "invalid transition: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Db(format!("snapshot serialization: {err}"))
    }
}
