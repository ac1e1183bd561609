//! API route definitions.

use axum::Router;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use feeledger_core::balance::BalanceQuery;
use feeledger_shared::types::TermNumber;

use crate::AppState;
use crate::error::ApiError;

pub mod audit;
pub mod balances;
pub mod fee_structures;
pub mod grades;
pub mod health;
pub mod payments;
pub mod pupils;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(grades::routes())
        .merge(pupils::routes())
        .merge(fee_structures::routes())
        .merge(payments::routes())
        .merge(balances::routes())
        .merge(reports::routes())
        .merge(audit::routes())
}

/// Query string selecting one term of one year.
#[derive(Debug, Deserialize)]
pub struct TermQuery {
    /// Term number (1-3).
    pub term: i16,
    /// Academic year.
    pub year: i32,
    /// Reference date for overdue checks; defaults to today (UTC).
    pub as_of: Option<NaiveDate>,
}

impl TermQuery {
    /// Converts to a [`BalanceQuery`], rejecting bad term numbers.
    pub fn balance_query(&self) -> Result<BalanceQuery, ApiError> {
        Ok(BalanceQuery::new(
            parse_term(self.term)?,
            self.year,
            self.as_of.unwrap_or_else(today),
        ))
    }
}

pub(crate) fn parse_term(value: i16) -> Result<TermNumber, ApiError> {
    TermNumber::try_from(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
