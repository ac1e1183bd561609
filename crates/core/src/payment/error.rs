//! Payment ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use feeledger_shared::AppError;
use feeledger_shared::types::{AmountError, PaymentId, PupilId, UserId};

use crate::access::AccessDenied;
use crate::payment::types::{PaymentOperation, PaymentState};

/// Errors from payment ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Payment amounts must be strictly positive.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

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

    /// Operation needs a non-empty reason.
    #[error("A reason is required to {0}")]
    ReasonRequired(PaymentOperation),

    /// Payment references a pupil that does not exist.
    #[error("Unknown pupil: {0}")]
    UnknownPupil(PupilId),

    /// Other input validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed from the payment's current state.
    #[error("Cannot {operation} payment {payment_id} in state {state}")]
    InvalidState {
        /// The payment.
        payment_id: PaymentId,
        /// Its current state.
        state: PaymentState,
        /// The attempted operation.
        operation: PaymentOperation,
    },

    /// Payment does not exist.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Reviewer recorded the payment or requested its deletion.
    #[error("User {actor_id} may not {operation} a payment they recorded or asked to delete")]
    SegregationOfDuties {
        /// The reviewer.
        actor_id: UserId,
        /// The attempted operation.
        operation: PaymentOperation,
    },

    /// Actor lacks the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Store failure; the transaction was rolled back.
    #[error("Store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount(_)
            | Self::InvalidAmount(_)
            | Self::YearOutOfRange { .. }
            | Self::ReasonRequired(_)
            | Self::UnknownPupil(_)
            | Self::Validation(_) => 400,

            Self::SegregationOfDuties { .. } | Self::AccessDenied(_) => 403,

            Self::PaymentNotFound(_) => 404,

            Self::InvalidState { .. } => 409,

            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::YearOutOfRange { .. } => "YEAR_OUT_OF_RANGE",
            Self::ReasonRequired(_) => "REASON_REQUIRED",
            Self::UnknownPupil(_) => "UNKNOWN_PUPIL",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::SegregationOfDuties { .. } => "SEGREGATION_OF_DUTIES",
            Self::AccessDenied(_) => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::NonPositiveAmount(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::YearOutOfRange { .. }
            | LedgerError::ReasonRequired(_)
            | LedgerError::UnknownPupil(_)
            | LedgerError::Validation(_) => Self::Validation(message),
            LedgerError::SegregationOfDuties { .. } | LedgerError::AccessDenied(_) => {
                Self::Forbidden(message)
            }
            LedgerError::PaymentNotFound(_) => Self::NotFound(message),
            LedgerError::InvalidState { .. } => Self::InvalidState(message),
            LedgerError::Store(_) => Self::Store(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_state_error() {
        let err = LedgerError::InvalidState {
            payment_id: PaymentId::new(),
            state: PaymentState::DeletionApproved,
            operation: PaymentOperation::ApproveDeletion,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert!(err.to_string().contains("deletion_approved"));
        assert!(err.to_string().contains("approve_deletion"));
    }

    #[test]
    fn test_validation_errors_are_400() {
        assert_eq!(LedgerError::NonPositiveAmount(dec!(0)).status_code(), 400);
        assert_eq!(
            LedgerError::ReasonRequired(PaymentOperation::SoftDelete).status_code(),
            400
        );
        assert_eq!(LedgerError::UnknownPupil(PupilId::new()).status_code(), 400);

        let err = LedgerError::from(AmountError::TooPrecise(dec!(0.001)));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_AMOUNT");
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 400);
    }

    #[test]
    fn test_segregation_of_duties_is_forbidden() {
        let err = LedgerError::SegregationOfDuties {
            actor_id: UserId::new(),
            operation: PaymentOperation::ApproveDeletion,
        };
        assert_eq!(err.status_code(), 403);
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 403);
    }

    #[test]
    fn test_store_error_maps_to_store() {
        let app: AppError = LedgerError::Store("timeout".to_string()).into();
        assert_eq!(app.error_code(), "STORE_ERROR");
    }
}
