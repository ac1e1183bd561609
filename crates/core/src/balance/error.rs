//! Reconciliation error types.

use thiserror::Error;

use feeledger_shared::AppError;
use feeledger_shared::types::{GradeId, PupilId};

use crate::access::AccessDenied;
use crate::fees::FeeError;

/// Errors from balance and summary reads.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Pupil does not exist.
    #[error("Pupil not found: {0}")]
    PupilNotFound(PupilId),

    /// Grade does not exist.
    #[error("Grade not found: {0}")]
    GradeNotFound(GradeId),

    /// Year outside the accepted range.
    #[error("Year {year} is outside {min}..={max}")]
    YearOutOfRange {
        /// Requested year.
        year: i32,
        /// Earliest accepted year.
        min: i32,
        /// Latest accepted year.
        max: i32,
    },

    /// Fee catalog inconsistency.
    #[error(transparent)]
    Fee(#[from] FeeError),

    /// Actor lacks the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl ReconciliationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::YearOutOfRange { .. } => 400,
            Self::AccessDenied(_) => 403,
            Self::PupilNotFound(_) | Self::GradeNotFound(_) => 404,
            Self::Fee(err) => err.status_code(),
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PupilNotFound(_) => "PUPIL_NOT_FOUND",
            Self::GradeNotFound(_) => "GRADE_NOT_FOUND",
            Self::YearOutOfRange { .. } => "YEAR_OUT_OF_RANGE",
            Self::Fee(err) => err.error_code(),
            Self::AccessDenied(_) => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        let message = err.to_string();
        match err {
            ReconciliationError::PupilNotFound(_) | ReconciliationError::GradeNotFound(_) => {
                Self::NotFound(message)
            }
            ReconciliationError::YearOutOfRange { .. } => Self::Validation(message),
            ReconciliationError::Fee(err) => err.into(),
            ReconciliationError::AccessDenied(_) => Self::Forbidden(message),
            ReconciliationError::Store(_) => Self::Store(message),
        }
    }
}
