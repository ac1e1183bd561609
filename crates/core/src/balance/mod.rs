//! Balance reconciliation.
//!
//! Derives what a pupil owes, has paid and still owes for a term from the
//! fee catalog and the payment ledger. Balances are recomputed on every
//! read and never stored.

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{BalanceQuery, ReconciliationEngine};
pub use error::ReconciliationError;
pub use types::{PaymentStatus, PupilBalance};
