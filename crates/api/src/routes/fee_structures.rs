//! Fee catalog routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use feeledger_db::FeeStructureFilter;
use feeledger_shared::types::{FeeStructureId, GradeId};

use super::parse_term;
use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the fee structure routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/fee-structures",
            get(list_fee_structures).put(upsert_fee_structure),
        )
        .route("/fee-structures/resolve", get(resolve_fee))
        .route("/fee-structures/{fee_structure_id}", get(get_fee_structure))
        .route(
            "/fee-structures/{fee_structure_id}/active",
            patch(set_active),
        )
}

/// Query string for listing fee structures.
#[derive(Debug, Deserialize)]
pub struct ListFeeStructuresQuery {
    /// Only this grade.
    pub grade_id: Option<Uuid>,
    /// Only this term.
    pub term: Option<i16>,
    /// Only this year.
    pub year: Option<i32>,
    /// Only active structures.
    #[serde(default)]
    pub active_only: bool,
}

/// Query string identifying a fee key.
#[derive(Debug, Deserialize)]
pub struct FeeKeyQuery {
    /// Grade.
    pub grade_id: Uuid,
    /// Term number (1-3).
    pub term: i16,
    /// Academic year.
    pub year: i32,
}

/// Request body for setting the fee of a key.
#[derive(Debug, Deserialize)]
pub struct UpsertFeeStructureRequest {
    /// Grade.
    pub grade_id: Uuid,
    /// Term number (1-3).
    pub term: i16,
    /// Academic year.
    pub year: i32,
    /// Amount owed per pupil; zero is allowed.
    pub amount: Decimal,
}

/// Request body for toggling a structure.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    /// Whether the structure should be in force.
    pub active: bool,
}

/// GET `/fee-structures`
async fn list_fee_structures(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<ListFeeStructuresQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = FeeStructureFilter {
        grade_id: query.grade_id.map(GradeId::from_uuid),
        term: query.term.map(parse_term).transpose()?,
        year: query.year,
        active_only: query.active_only,
    };
    let structures = state.fees.list_fee_structures(filter, &actor).await?;
    Ok(Json(json!({ "fee_structures": structures })))
}

/// GET `/fee-structures/resolve` - The active fee for a key, 404 if none.
async fn resolve_fee(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<FeeKeyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let structure = state
        .fees
        .resolve_fee(
            GradeId::from_uuid(query.grade_id),
            parse_term(query.term)?,
            query.year,
            &actor,
        )
        .await?;
    Ok(Json(structure))
}

/// PUT `/fee-structures` - Replace the active fee for a key.
async fn upsert_fee_structure(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<UpsertFeeStructureRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let upsert = state
        .fees
        .upsert_fee_structure(
            GradeId::from_uuid(payload.grade_id),
            parse_term(payload.term)?,
            payload.year,
            payload.amount,
            &actor,
        )
        .await?;
    let status = if upsert.changed {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(json!({
            "fee_structure": upsert.structure,
            "deactivated": upsert.deactivated,
        })),
    ))
}

/// GET `/fee-structures/{fee_structure_id}`
async fn get_fee_structure(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(fee_structure_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let structure = state
        .fees
        .get_fee_structure(FeeStructureId::from_uuid(fee_structure_id), &actor)
        .await?;
    Ok(Json(structure))
}

/// PATCH `/fee-structures/{fee_structure_id}/active`
async fn set_active(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(fee_structure_id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let structure = state
        .fees
        .set_fee_structure_active(
            FeeStructureId::from_uuid(fee_structure_id),
            payload.active,
            &actor,
        )
        .await?;
    Ok(Json(structure))
}
