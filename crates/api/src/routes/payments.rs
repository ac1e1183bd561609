//! Payment ledger routes.
//!
//! Deletion is a two-step workflow: a clerk requests it, an admin approves
//! or rejects it. Nothing here removes a payment row.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use feeledger_core::payment::NewPayment;
use feeledger_shared::types::{PageRequest, PaymentId, PupilId};

use super::parse_term;
use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(record_payment))
        .route("/payments/pending-deletions", get(list_pending_deletions))
        .route("/payments/{payment_id}", get(get_payment))
        .route("/payments/{payment_id}/deletion-request", post(soft_delete))
        .route("/payments/{payment_id}/deletion/approve", post(approve))
        .route("/payments/{payment_id}/deletion/reject", post(reject))
        .route("/pupils/{pupil_id}/payments", get(list_for_pupil))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Pupil the payment is for.
    pub pupil_id: Uuid,
    /// Term number (1-3).
    pub term: i16,
    /// Academic year.
    pub year: i32,
    /// Amount paid; must be positive.
    pub amount: Decimal,
    /// Receipt or bank reference.
    pub reference: Option<String>,
}

/// Request body carrying a reason.
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    /// Why the action is taken.
    #[serde(default)]
    pub reason: String,
}

/// Optional term/year filter.
#[derive(Debug, Deserialize)]
pub struct PaymentFilterQuery {
    /// Term number (1-3).
    pub term: Option<i16>,
    /// Academic year.
    pub year: Option<i32>,
}

/// POST `/payments`
async fn record_payment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewPayment {
        pupil_id: PupilId::from_uuid(payload.pupil_id),
        term: parse_term(payload.term)?,
        year: payload.year,
        amount: payload.amount,
        reference: payload.reference,
    };
    let payment = state.payments.record_payment(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET `/payments/{payment_id}`
async fn get_payment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .payments
        .get_payment(PaymentId::from_uuid(payment_id), &actor)
        .await?;
    Ok(Json(payment))
}

/// POST `/payments/{payment_id}/deletion-request`
async fn soft_delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .payments
        .soft_delete_payment(PaymentId::from_uuid(payment_id), &payload.reason, &actor)
        .await?;
    Ok(Json(payment))
}

/// POST `/payments/{payment_id}/deletion/approve`
async fn approve(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .payments
        .approve_deletion(PaymentId::from_uuid(payment_id), &actor)
        .await?;
    Ok(Json(payment))
}

/// POST `/payments/{payment_id}/deletion/reject`
async fn reject(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .payments
        .reject_deletion(PaymentId::from_uuid(payment_id), &payload.reason, &actor)
        .await?;
    Ok(Json(payment))
}

/// GET `/payments/pending-deletions` - Approval queue, oldest request first.
async fn list_pending_deletions(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.payments.list_pending_deletions(&page, &actor).await?;
    Ok(Json(page))
}

/// GET `/pupils/{pupil_id}/payments`
async fn list_for_pupil(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(pupil_id): Path<Uuid>,
    Query(query): Query<PaymentFilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state
        .payments
        .list_payments_for_pupil(
            PupilId::from_uuid(pupil_id),
            query.term.map(parse_term).transpose()?,
            query.year,
            &actor,
        )
        .await?;
    Ok(Json(json!({ "payments": payments })))
}
