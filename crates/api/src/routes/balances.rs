//! Balance and summary routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use uuid::Uuid;

use feeledger_shared::types::{GradeId, PupilId};

use super::TermQuery;
use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pupils/{pupil_id}/balance", get(pupil_balance))
        .route("/grades/{grade_id}/balances", get(grade_balances))
        .route("/grades/{grade_id}/summary", get(grade_summary))
        .route("/summary", get(school_summary))
}

/// GET `/pupils/{pupil_id}/balance?term=&year=&as_of=`
async fn pupil_balance(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
    Query(query): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let balance = state
        .balances
        .compute_pupil_balance(PupilId::from_uuid(pupil_id), query.balance_query()?, &actor)
        .await?;
    Ok(Json(balance))
}

/// GET `/grades/{grade_id}/balances?term=&year=&as_of=`
async fn grade_balances(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(grade_id): Path<Uuid>,
    Query(query): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let balances = state
        .balances
        .list_grade_balances(GradeId::from_uuid(grade_id), query.balance_query()?, &actor)
        .await?;
    Ok(Json(json!({ "balances": balances })))
}

/// GET `/grades/{grade_id}/summary?term=&year=&as_of=`
async fn grade_summary(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(grade_id): Path<Uuid>,
    Query(query): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .balances
        .compute_grade_summary(GradeId::from_uuid(grade_id), query.balance_query()?, &actor)
        .await?;
    Ok(Json(summary))
}

/// GET `/summary?term=&year=&as_of=` - Whole-school summary with per-grade breakdown.
async fn school_summary(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .balances
        .compute_school_summary(query.balance_query()?, &actor)
        .await?;
    Ok(Json(summary))
}
