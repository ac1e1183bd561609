//! Collection reporting.
//!
//! Pure folds over reconciled pupil balances:
//! - Grade summary
//! - School summary
//! - Collection trend across the terms of a year
//! - Grade × term heatmap

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::*;
