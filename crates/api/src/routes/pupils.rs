//! Pupil and guardian routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use feeledger_core::school::{NewParent, NewPupil, PupilStatus};
use feeledger_shared::types::{GradeId, ParentId, PupilId};

use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the pupil routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pupils", post(create_pupil))
        .route("/pupils/{pupil_id}", get(get_pupil))
        .route("/pupils/{pupil_id}/status", patch(update_status))
        .route("/pupils/{pupil_id}/grade", patch(move_grade))
        .route(
            "/pupils/{pupil_id}/parents",
            get(list_parents).post(link_parent),
        )
        .route("/parents", post(create_parent))
}

/// Request body for changing a pupil's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status: active, inactive, graduated or withdrawn.
    pub status: String,
}

/// Request body for moving a pupil.
#[derive(Debug, Deserialize)]
pub struct MoveGradeRequest {
    /// Target grade.
    pub grade_id: Uuid,
}

/// Request body for linking a guardian.
#[derive(Debug, Deserialize)]
pub struct LinkParentRequest {
    /// Guardian to link.
    pub parent_id: Uuid,
    /// Relationship, e.g. "mother".
    pub relationship: Option<String>,
}

/// POST `/pupils`
async fn create_pupil(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<NewPupil>,
) -> Result<impl IntoResponse, ApiError> {
    let pupil = state.pupils.create_pupil(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(pupil)))
}

/// GET `/pupils/{pupil_id}`
async fn get_pupil(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pupil = state
        .pupils
        .get_pupil(PupilId::from_uuid(pupil_id), &actor)
        .await?;
    Ok(Json(pupil))
}

/// PATCH `/pupils/{pupil_id}/status`
async fn update_status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = PupilStatus::parse(&payload.status).ok_or_else(|| {
        ApiError::bad_request(format!("Unknown pupil status: {}", payload.status))
    })?;
    let pupil = state
        .pupils
        .update_status(PupilId::from_uuid(pupil_id), status, &actor)
        .await?;
    Ok(Json(pupil))
}

/// PATCH `/pupils/{pupil_id}/grade`
async fn move_grade(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
    Json(payload): Json<MoveGradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pupil = state
        .pupils
        .move_grade(
            PupilId::from_uuid(pupil_id),
            GradeId::from_uuid(payload.grade_id),
            &actor,
        )
        .await?;
    Ok(Json(pupil))
}

/// GET `/pupils/{pupil_id}/parents`
async fn list_parents(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let parents = state
        .pupils
        .list_parents(PupilId::from_uuid(pupil_id), &actor)
        .await?;
    Ok(Json(json!({ "parents": parents })))
}

/// POST `/pupils/{pupil_id}/parents`
async fn link_parent(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
    Json(payload): Json<LinkParentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .pupils
        .link_parent(
            PupilId::from_uuid(pupil_id),
            ParentId::from_uuid(payload.parent_id),
            payload.relationship,
            &actor,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/parents`
async fn create_parent(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<NewParent>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = state.pupils.create_parent(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(parent)))
}
