//! Fee catalog.
//!
//! Resolves the fee owed for a (grade, term, year) key and plans
//! fee-structure replacements so that at most one structure per key is
//! active at any time.

pub mod catalog;
pub mod error;
pub mod types;

#[cfg(test)]
mod catalog_props;

pub use catalog::FeeCatalog;
pub use error::FeeError;
pub use types::{FeeKey, FeeStructure, UpsertPlan};
