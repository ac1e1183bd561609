//! Audit trail routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use uuid::Uuid;

use feeledger_core::audit::AuditTable;

use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit-logs/{table}/{record_id}", get(list_for_record))
}

fn parse_table(table: &str) -> Option<AuditTable> {
    [
        AuditTable::Grades,
        AuditTable::FeeStructures,
        AuditTable::Pupils,
        AuditTable::Parents,
        AuditTable::PupilParents,
        AuditTable::Payments,
    ]
    .into_iter()
    .find(|t| t.as_str() == table)
}

/// GET `/audit-logs/{table}/{record_id}` - History of one record, oldest first.
async fn list_for_record(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((table, record_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let table = parse_table(&table)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown audited table: {table}")))?;
    let entries = state
        .audit
        .list_for_record(table, record_id, &actor)
        .await?;
    Ok(Json(json!({ "entries": entries })))
}
