//! Domain model definitions.

pub mod ledger;
pub mod queue;
pub mod signal;
pub mod ticket;
