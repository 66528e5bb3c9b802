#![forbid(unsafe_code)]

//! `buildboard` — submission workflow engine.
//!
//! Routes human-submitted change requests ("bug" or "feature" for a named
//! app) through a reviewer-driven state machine, hands approved tickets to
//! a single external build worker via a durable FIFO queue, and records
//! token rewards to contributors in a weekly ledger.

pub mod collab;
pub mod completion;
pub mod config;
pub mod errors;
pub mod intake;
pub mod ledger;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod review;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
