//! Core business logic for Feeledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `access` - Actor roles and permission checks
//! - `calendar` - Accepted academic years and term due-date policy
//! - `school` - Grades, pupils and guardians
//! - `fees` - Fee catalog resolution and upsert planning
//! - `payment` - Payment ledger and the soft-delete approval state machine
//! - `balance` - Balance reconciliation engine
//! - `audit` - Audit record construction
//! - `reports` - Grade/school summaries, collection trend and heatmap

pub mod access;
pub mod audit;
pub mod balance;
pub mod calendar;
pub mod fees;
pub mod payment;
pub mod reports;
pub mod school;
