//! Audit trail records.
//!
//! Every mutation on a financial entity is paired with exactly one
//! [`AuditRecord`], written on the same store transaction as the mutation.

pub mod error;
pub mod types;

pub use error::AuditError;
pub use types::*;
