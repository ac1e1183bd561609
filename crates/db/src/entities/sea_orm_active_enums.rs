//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pupil_status")]
pub enum PupilStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "graduated")]
    Graduated,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_state")]
pub enum PaymentState {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "pending_deletion")]
    PendingDeletion,
    #[sea_orm(string_value = "deletion_approved")]
    DeletionApproved,
    #[sea_orm(string_value = "deletion_rejected")]
    DeletionRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_action")]
pub enum AuditAction {
    #[sea_orm(string_value = "CREATE")]
    Create,
    #[sea_orm(string_value = "UPDATE")]
    Update,
    #[sea_orm(string_value = "SOFT_DELETE")]
    SoftDelete,
    #[sea_orm(string_value = "APPROVE_DELETION")]
    ApproveDeletion,
    #[sea_orm(string_value = "REJECT_DELETION")]
    RejectDeletion,
    #[sea_orm(string_value = "ACTIVATE")]
    Activate,
    #[sea_orm(string_value = "DEACTIVATE")]
    Deactivate,
    #[sea_orm(string_value = "DELETE")]
    Delete,
}
