//! Collection report routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::today;
use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/collection-trend", get(collection_trend))
        .route("/reports/heatmap", get(heatmap))
}

/// Query string selecting a year.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    /// Academic year.
    pub year: i32,
    /// Reference date for overdue checks; defaults to today (UTC).
    pub as_of: Option<NaiveDate>,
}

/// GET `/reports/collection-trend?year=`
async fn collection_trend(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let trend = state
        .balances
        .collection_trend(query.year, query.as_of.unwrap_or_else(today), &actor)
        .await?;
    Ok(Json(trend))
}

/// GET `/reports/heatmap?year=`
async fn heatmap(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let heatmap = state
        .balances
        .heatmap(query.year, query.as_of.unwrap_or_else(today), &actor)
        .await?;
    Ok(Json(heatmap))
}
