//! Global configuration parsing and validation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::ticket::RewardKind;
use crate::{AppError, Result};

/// Display metadata for one entry in the closed app registry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AppEntry {
    /// Human-readable application name.
    pub name: String,
    /// Optional source repository slug for the app.
    #[serde(default)]
    pub repo: Option<String>,
}

/// Reward amounts (token units) granted per action type.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RewardConfig {
    /// Tokens credited when a ticket is approved.
    #[serde(default = "default_approval_reward")]
    pub approval: u64,
    /// Bonus tokens credited when an approved ticket ships.
    #[serde(default = "default_ship_bonus")]
    pub ship_bonus: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            approval: default_approval_reward(),
            ship_bonus: default_ship_bonus(),
        }
    }
}

fn default_approval_reward() -> u64 {
    50
}

fn default_ship_bonus() -> u64 {
    100
}

fn default_min_submission_chars() -> usize {
    20
}

fn default_dedup_window_seconds() -> u64 {
    300
}

fn default_completion_poll_seconds() -> u64 {
    30
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Directory holding the `SQLite` database and other durable state.
    pub state_dir: PathBuf,
    /// Closed registry of known apps, keyed by app tag (e.g. `app-42`).
    pub apps: HashMap<String, AppEntry>,
    /// User IDs holding reviewer privilege.
    pub reviewer_user_ids: Vec<String>,
    /// User IDs eligible to submit. Empty means everyone is eligible.
    #[serde(default)]
    pub submitter_user_ids: Vec<String>,
    /// Channel reference where reviewer notifications are posted.
    pub review_channel_id: String,
    /// Minimum normalized submission length in characters.
    #[serde(default = "default_min_submission_chars")]
    pub min_submission_chars: usize,
    /// Sliding window for best-effort message deduplication.
    #[serde(default = "default_dedup_window_seconds")]
    pub dedup_window_seconds: u64,
    /// Interval between completion-signal polls.
    #[serde(default = "default_completion_poll_seconds")]
    pub completion_poll_seconds: u64,
    /// Reward amounts per action type.
    #[serde(default)]
    pub rewards: RewardConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Derived path for the `SQLite` database file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join("buildboard.db")
    }

    /// Look up an app tag in the closed registry.
    #[must_use]
    pub fn app(&self, tag: &str) -> Option<&AppEntry> {
        self.apps.get(tag)
    }

    /// Whether a user holds reviewer privilege.
    #[must_use]
    pub fn is_reviewer(&self, user_id: &str) -> bool {
        self.reviewer_user_ids.iter().any(|id| id == user_id)
    }

    /// Whether a user is eligible to submit requests.
    ///
    /// An empty `submitter_user_ids` list means submissions are open to all.
    #[must_use]
    pub fn is_submitter(&self, user_id: &str) -> bool {
        self.submitter_user_ids.is_empty()
            || self.submitter_user_ids.iter().any(|id| id == user_id)
    }

    /// Configured reward amount for an action type.
    #[must_use]
    pub fn reward_amount(&self, kind: RewardKind) -> u64 {
        match kind {
            RewardKind::Approval => self.rewards.approval,
            RewardKind::ShipBonus => self.rewards.ship_bonus,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.apps.is_empty() {
            return Err(AppError::Config("app registry must not be empty".into()));
        }

        if self.reviewer_user_ids.is_empty() {
            return Err(AppError::Config(
                "reviewer_user_ids must not be empty".into(),
            ));
        }

        if self.min_submission_chars == 0 {
            return Err(AppError::Config(
                "min_submission_chars must be greater than zero".into(),
            ));
        }

        if self.dedup_window_seconds == 0 {
            return Err(AppError::Config(
                "dedup_window_seconds must be greater than zero".into(),
            ));
        }

        if self.review_channel_id.is_empty() {
            return Err(AppError::Config("review_channel_id must be set".into()));
        }

        Ok(())
    }
}
