//! Fee catalog error types.

use rust_decimal::Decimal;
use thiserror::Error;

use feeledger_shared::AppError;
use feeledger_shared::types::{AmountError, FeeStructureId, GradeId};

use crate::access::AccessDenied;
use crate::fees::types::FeeKey;

/// Errors from fee catalog operations.
#[derive(Debug, Error)]
pub enum FeeError {
    /// No active fee structure for the key. Distinct from a zero fee.
    #[error("No active fee structure for {0}")]
    NotFound(FeeKey),

    /// Fee structure id does not exist.
    #[error("Fee structure not found: {0}")]
    FeeStructureNotFound(FeeStructureId),

    /// Grade does not exist.
    #[error("Grade not found: {0}")]
    GradeNotFound(GradeId),

    /// Fee amounts cannot be negative.
    #[error("Fee amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// Amount the money column cannot hold exactly.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

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

    /// More than one active structure for a key was found in the store.
    #[error("Multiple active fee structures for {0}")]
    DuplicateActive(FeeKey),

    /// Actor lacks the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl FeeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NegativeAmount(_) | Self::InvalidAmount(_) | Self::YearOutOfRange { .. } => 400,
            Self::AccessDenied(_) => 403,
            Self::NotFound(_) | Self::FeeStructureNotFound(_) | Self::GradeNotFound(_) => 404,
            Self::DuplicateActive(_) | Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "FEE_NOT_CONFIGURED",
            Self::FeeStructureNotFound(_) => "FEE_STRUCTURE_NOT_FOUND",
            Self::GradeNotFound(_) => "GRADE_NOT_FOUND",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::YearOutOfRange { .. } => "YEAR_OUT_OF_RANGE",
            Self::DuplicateActive(_) => "DUPLICATE_ACTIVE_FEE",
            Self::AccessDenied(_) => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<FeeError> for AppError {
    fn from(err: FeeError) -> Self {
        let message = err.to_string();
        match err {
            FeeError::NegativeAmount(_)
            | FeeError::InvalidAmount(_)
            | FeeError::YearOutOfRange { .. } => Self::Validation(message),
            FeeError::NotFound(_)
            | FeeError::FeeStructureNotFound(_)
            | FeeError::GradeNotFound(_) => Self::NotFound(message),
            FeeError::AccessDenied(_) => Self::Forbidden(message),
            FeeError::DuplicateActive(_) => Self::Internal(message),
            FeeError::Store(_) => Self::Store(message),
        }
    }
}
