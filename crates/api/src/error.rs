//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use feeledger_core::access::AccessDenied;
use feeledger_core::audit::AuditError;
use feeledger_core::balance::ReconciliationError;
use feeledger_core::fees::FeeError;
use feeledger_core::payment::LedgerError;
use feeledger_core::school::SchoolError;
use feeledger_shared::AppError;

/// Error rendered as `{ "error": code, "message": text }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Builds an error from a status code and message.
    #[must_use]
    pub fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
        }
    }

    /// A 400 for malformed request parameters.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "VALIDATION_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "request failed");
            "An error occurred".to_string()
        } else {
            warn!(
                code = self.code,
                status = self.status.as_u16(),
                error = %self.message,
                "request rejected"
            );
            self.message
        };
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        AppError::from(err).into()
    }
}

macro_rules! domain_error_into {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self::new(err.status_code(), err.error_code(), err.to_string())
                }
            }
        )+
    };
}

domain_error_into!(SchoolError, FeeError, LedgerError, ReconciliationError, AuditError);
