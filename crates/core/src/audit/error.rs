//! Audit log read errors.

use thiserror::Error;

use feeledger_shared::AppError;

use crate::access::AccessDenied;

/// Errors from reading the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Actor lacks the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl AuditError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AccessDenied(_) => 403,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        let message = err.to_string();
        match err {
            AuditError::AccessDenied(_) => Self::Forbidden(message),
            AuditError::Store(_) => Self::Store(message),
        }
    }
}
