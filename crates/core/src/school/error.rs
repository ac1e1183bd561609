//! School registry error types.

use thiserror::Error;

use feeledger_shared::AppError;
use feeledger_shared::types::{GradeId, ParentId, PupilId};

use crate::access::AccessDenied;

/// Errors from grade, pupil and guardian operations.
#[derive(Debug, Error)]
pub enum SchoolError {
    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Grade not found.
    #[error("Grade not found: {0}")]
    GradeNotFound(GradeId),

    /// Pupil not found.
    #[error("Pupil not found: {0}")]
    PupilNotFound(PupilId),

    /// Parent not found.
    #[error("Parent not found: {0}")]
    ParentNotFound(ParentId),

    /// Grade name already taken.
    #[error("Grade name already exists: {0}")]
    DuplicateGradeName(String),

    /// Grade still referenced by pupils or fee structures.
    #[error("Grade {grade_id} is referenced by {pupils} pupil(s) and {fee_structures} fee structure(s)")]
    GradeInUse {
        /// The grade.
        grade_id: GradeId,
        /// Dependent pupils.
        pupils: u64,
        /// Dependent fee structures.
        fee_structures: u64,
    },

    /// Actor lacks the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl SchoolError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::AccessDenied(_) => 403,
            Self::GradeNotFound(_) | Self::PupilNotFound(_) | Self::ParentNotFound(_) => 404,
            Self::DuplicateGradeName(_) | Self::GradeInUse { .. } => 409,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::GradeNotFound(_) => "GRADE_NOT_FOUND",
            Self::PupilNotFound(_) => "PUPIL_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DuplicateGradeName(_) => "DUPLICATE_GRADE_NAME",
            Self::GradeInUse { .. } => "GRADE_IN_USE",
            Self::AccessDenied(_) => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<SchoolError> for AppError {
    fn from(err: SchoolError) -> Self {
        let message = err.to_string();
        match err {
            SchoolError::Validation(_) => Self::Validation(message),
            SchoolError::GradeNotFound(_)
            | SchoolError::PupilNotFound(_)
            | SchoolError::ParentNotFound(_) => Self::NotFound(message),
            SchoolError::DuplicateGradeName(_) | SchoolError::GradeInUse { .. } => {
                Self::Conflict(message)
            }
            SchoolError::AccessDenied(_) => Self::Forbidden(message),
            SchoolError::Store(_) => Self::Store(message),
        }
    }
}
