//! Conversions between entity models and domain types.

use feeledger_core::audit::{AuditAction as CoreAuditAction, AuditLogEntry};
use feeledger_core::fees::FeeStructure;
use feeledger_core::payment::{Payment, PaymentState as CorePaymentState};
use feeledger_core::school::{Grade, Parent, Pupil, PupilStatus as CorePupilStatus};
use feeledger_shared::types::{
    AuditLogId, FeeStructureId, GradeId, ParentId, PaymentId, PupilId, TermNumber, UserId,
};

use super::sea_orm_active_enums::{AuditAction, PaymentState, PupilStatus};
use super::{audit_logs, fee_structures, grades, parents, payments, pupils};
use crate::store::StoreError;

impl From<PupilStatus> for CorePupilStatus {
    fn from(status: PupilStatus) -> Self {
        match status {
            PupilStatus::Active => Self::Active,
            PupilStatus::Inactive => Self::Inactive,
            PupilStatus::Graduated => Self::Graduated,
            PupilStatus::Withdrawn => Self::Withdrawn,
        }
    }
}

impl From<CorePupilStatus> for PupilStatus {
    fn from(status: CorePupilStatus) -> Self {
        match status {
            CorePupilStatus::Active => Self::Active,
            CorePupilStatus::Inactive => Self::Inactive,
            CorePupilStatus::Graduated => Self::Graduated,
            CorePupilStatus::Withdrawn => Self::Withdrawn,
        }
    }
}

impl From<PaymentState> for CorePaymentState {
    fn from(state: PaymentState) -> Self {
        match state {
            PaymentState::Active => Self::Active,
            PaymentState::PendingDeletion => Self::PendingDeletion,
            PaymentState::DeletionApproved => Self::DeletionApproved,
            PaymentState::DeletionRejected => Self::DeletionRejected,
        }
    }
}

impl From<CorePaymentState> for PaymentState {
    fn from(state: CorePaymentState) -> Self {
        match state {
            CorePaymentState::Active => Self::Active,
            CorePaymentState::PendingDeletion => Self::PendingDeletion,
            CorePaymentState::DeletionApproved => Self::DeletionApproved,
            CorePaymentState::DeletionRejected => Self::DeletionRejected,
        }
    }
}

impl From<AuditAction> for CoreAuditAction {
    fn from(action: AuditAction) -> Self {
        match action {
            AuditAction::Create => Self::Create,
            AuditAction::Update => Self::Update,
            AuditAction::SoftDelete => Self::SoftDelete,
            AuditAction::ApproveDeletion => Self::ApproveDeletion,
            AuditAction::RejectDeletion => Self::RejectDeletion,
            AuditAction::Activate => Self::Activate,
            AuditAction::Deactivate => Self::Deactivate,
            AuditAction::Delete => Self::Delete,
        }
    }
}

impl From<CoreAuditAction> for AuditAction {
    fn from(action: CoreAuditAction) -> Self {
        match action {
            CoreAuditAction::Create => Self::Create,
            CoreAuditAction::Update => Self::Update,
            CoreAuditAction::SoftDelete => Self::SoftDelete,
            CoreAuditAction::ApproveDeletion => Self::ApproveDeletion,
            CoreAuditAction::RejectDeletion => Self::RejectDeletion,
            CoreAuditAction::Activate => Self::Activate,
            CoreAuditAction::Deactivate => Self::Deactivate,
            CoreAuditAction::Delete => Self::Delete,
        }
    }
}

fn term(value: i16, table: &str) -> Result<TermNumber, StoreError> {
    TermNumber::try_from(value).map_err(|e| StoreError::Corrupt(format!("{table}: {e}")))
}

impl From<grades::Model> for Grade {
    fn from(model: grades::Model) -> Self {
        Self {
            id: GradeId::from_uuid(model.id),
            name: model.name,
            created_at: model.created_at,
        }
    }
}

impl From<pupils::Model> for Pupil {
    fn from(model: pupils::Model) -> Self {
        Self {
            id: PupilId::from_uuid(model.id),
            full_name: model.full_name,
            grade_id: GradeId::from_uuid(model.grade_id),
            status: model.status.into(),
            enrolled_at: model.enrolled_at,
        }
    }
}

impl From<parents::Model> for Parent {
    fn from(model: parents::Model) -> Self {
        Self {
            id: ParentId::from_uuid(model.id),
            full_name: model.full_name,
            phone: model.phone,
            email: model.email,
        }
    }
}

impl TryFrom<fee_structures::Model> for FeeStructure {
    type Error = StoreError;

    fn try_from(model: fee_structures::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FeeStructureId::from_uuid(model.id),
            grade_id: GradeId::from_uuid(model.grade_id),
            term: term(model.term_number, "fee_structures")?,
            year: model.year,
            amount: model.amount,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<payments::Model> for Payment {
    type Error = StoreError;

    fn try_from(model: payments::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentId::from_uuid(model.id),
            pupil_id: PupilId::from_uuid(model.pupil_id),
            term: term(model.term_number, "payments")?,
            year: model.year,
            amount: model.amount,
            reference: model.reference,
            recorded_at: model.recorded_at,
            recorded_by: UserId::from_uuid(model.recorded_by),
            state: model.state.into(),
            deletion_reason: model.deletion_reason,
            deletion_requested_by: model.deletion_requested_by.map(UserId::from_uuid),
            deletion_requested_at: model.deletion_requested_at,
            deletion_reviewed_by: model.deletion_reviewed_by.map(UserId::from_uuid),
            deletion_reviewed_at: model.deletion_reviewed_at,
            rejection_reason: model.rejection_reason,
        })
    }
}

impl From<audit_logs::Model> for AuditLogEntry {
    fn from(model: audit_logs::Model) -> Self {
        Self {
            id: AuditLogId::from_uuid(model.id),
            action: model.action_type.into(),
            table_name: model.table_name,
            record_id: model.record_id,
            actor_id: UserId::from_uuid(model.actor_id),
            before_snapshot: model.before_snapshot,
            after_snapshot: model.after_snapshot,
            created_at: model.created_at,
        }
    }
}

/// Converts a list of rows, failing on the first corrupt one.
pub fn try_collect<M, T>(rows: Vec<M>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<M, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn payment_model(term_number: i16) -> payments::Model {
        let now = Utc::now();
        payments::Model {
            id: Uuid::now_v7(),
            pupil_id: Uuid::now_v7(),
            term_number,
            year: 2024,
            amount: dec!(250.00),
            reference: None,
            recorded_at: now,
            recorded_by: Uuid::now_v7(),
            state: PaymentState::PendingDeletion,
            deletion_reason: Some("duplicate".to_string()),
            deletion_requested_by: Some(Uuid::now_v7()),
            deletion_requested_at: Some(now),
            deletion_reviewed_by: None,
            deletion_reviewed_at: None,
            rejection_reason: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_model_converts() {
        let model = payment_model(2);
        let payment = Payment::try_from(model.clone()).unwrap();
        assert_eq!(payment.id.into_inner(), model.id);
        assert_eq!(payment.term, TermNumber::SECOND);
        assert_eq!(payment.state, CorePaymentState::PendingDeletion);
        assert_eq!(payment.amount, dec!(250.00));
    }

    #[test]
    fn test_out_of_range_term_is_corrupt() {
        assert!(matches!(
            Payment::try_from(payment_model(4)),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_state_conversion_round_trips() {
        for state in [
            CorePaymentState::Active,
            CorePaymentState::PendingDeletion,
            CorePaymentState::DeletionApproved,
            CorePaymentState::DeletionRejected,
        ] {
            assert_eq!(CorePaymentState::from(PaymentState::from(state)), state);
        }
    }
}
