//! Payment ledger.
//!
//! Records payments and drives the soft-delete approval workflow. A
//! payment is never physically removed: deletion is requested, then
//! approved or rejected by a reviewer.
//!
//! # Modules
//!
//! - `types` - Payment, `PaymentState` and transitions
//! - `error` - Ledger error types
//! - `service` - Recording rules and the state machine

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::{LedgerPolicy, PaymentLedger};
pub use types::{NewPayment, Payment, PaymentOperation, PaymentState, PaymentTransition};
