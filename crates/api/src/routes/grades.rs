//! Grade management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use feeledger_shared::types::GradeId;

use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the grade routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/grades", get(list_grades).post(create_grade))
        .route(
            "/grades/{grade_id}",
            get(get_grade).patch(rename_grade).delete(delete_grade),
        )
        .route("/grades/{grade_id}/pupils", get(list_pupils))
}

/// Request body for creating or renaming a grade.
#[derive(Debug, Deserialize)]
pub struct GradeNameRequest {
    /// Grade name, unique across the school.
    pub name: String,
}

/// GET `/grades`
async fn list_grades(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<impl IntoResponse, ApiError> {
    let grades = state.grades.list_grades(&actor).await?;
    Ok(Json(json!({ "grades": grades })))
}

/// POST `/grades`
async fn create_grade(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<GradeNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grade = state.grades.create_grade(&payload.name, &actor).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

/// GET `/grades/{grade_id}`
async fn get_grade(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(grade_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let grade = state
        .grades
        .get_grade(GradeId::from_uuid(grade_id), &actor)
        .await?;
    Ok(Json(grade))
}

/// PATCH `/grades/{grade_id}` - Rename a grade.
async fn rename_grade(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(grade_id): Path<Uuid>,
    Json(payload): Json<GradeNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grade = state
        .grades
        .rename_grade(GradeId::from_uuid(grade_id), &payload.name, &actor)
        .await?;
    Ok(Json(grade))
}

/// DELETE `/grades/{grade_id}` - Only grades nothing references.
async fn delete_grade(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(grade_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .grades
        .delete_grade(GradeId::from_uuid(grade_id), &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/grades/{grade_id}/pupils`
async fn list_pupils(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(grade_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pupils = state
        .pupils
        .list_by_grade(GradeId::from_uuid(grade_id), &actor)
        .await?;
    Ok(Json(json!({ "pupils": pupils })))
}
