//! Payment domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use feeledger_shared::types::{PaymentId, PupilId, TermNumber, UserId};

use crate::audit::AuditAction;

/// Payment state in the soft-delete workflow.
///
/// Valid transitions:
/// - Active → PendingDeletion (soft delete)
/// - PendingDeletion → DeletionApproved (approve)
/// - PendingDeletion → DeletionRejected (reject)
/// - DeletionRejected → PendingDeletion (soft delete again)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Payment is in force.
    Active,
    /// Deletion requested; the payment still counts.
    PendingDeletion,
    /// Deletion approved; the payment no longer counts. Terminal.
    DeletionApproved,
    /// Deletion rejected; behaves exactly like `Active`.
    DeletionRejected,
}

impl PaymentState {
    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingDeletion => "pending_deletion",
            Self::DeletionApproved => "deletion_approved",
            Self::DeletionRejected => "deletion_rejected",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "pending_deletion" => Some(Self::PendingDeletion),
            "deletion_approved" => Some(Self::DeletionApproved),
            "deletion_rejected" => Some(Self::DeletionRejected),
            _ => None,
        }
    }

    /// Returns true if payments in this state count towards collected totals.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        !matches!(self, Self::DeletionApproved)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::DeletionApproved)
    }

    /// The state `op` leads to, or `None` if `op` is not allowed from here.
    #[must_use]
    pub const fn next(self, op: PaymentOperation) -> Option<Self> {
        match (self, op) {
            (Self::Active | Self::DeletionRejected, PaymentOperation::SoftDelete) => {
                Some(Self::PendingDeletion)
            }
            (Self::PendingDeletion, PaymentOperation::ApproveDeletion) => {
                Some(Self::DeletionApproved)
            }
            (Self::PendingDeletion, PaymentOperation::RejectDeletion) => {
                Some(Self::DeletionRejected)
            }
            _ => None,
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation of the deletion workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOperation {
    /// Request deletion.
    SoftDelete,
    /// Approve a pending deletion.
    ApproveDeletion,
    /// Reject a pending deletion.
    RejectDeletion,
}

impl PaymentOperation {
    /// All workflow operations.
    pub const ALL: [Self; 3] = [Self::SoftDelete, Self::ApproveDeletion, Self::RejectDeletion];

    /// Audit action written when the operation succeeds.
    #[must_use]
    pub const fn audit_action(self) -> AuditAction {
        match self {
            Self::SoftDelete => AuditAction::SoftDelete,
            Self::ApproveDeletion => AuditAction::ApproveDeletion,
            Self::RejectDeletion => AuditAction::RejectDeletion,
        }
    }

    /// Returns the string representation of the operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoftDelete => "soft_delete",
            Self::ApproveDeletion => "approve_deletion",
            Self::RejectDeletion => "reject_deletion",
        }
    }
}

impl fmt::Display for PaymentOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: PaymentId,
    /// Pupil the payment is for.
    pub pupil_id: PupilId,
    /// Term paid for.
    pub term: TermNumber,
    /// Academic year paid for.
    pub year: i32,
    /// Amount paid, always positive.
    pub amount: Decimal,
    /// Receipt or bank reference.
    pub reference: Option<String>,
    /// When the payment was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Who recorded the payment.
    pub recorded_by: UserId,
    /// Workflow state.
    pub state: PaymentState,
    /// Why deletion was requested.
    pub deletion_reason: Option<String>,
    /// Who requested deletion.
    pub deletion_requested_by: Option<UserId>,
    /// When deletion was requested.
    pub deletion_requested_at: Option<DateTime<Utc>>,
    /// Who approved or rejected the request.
    pub deletion_reviewed_by: Option<UserId>,
    /// When the request was reviewed.
    pub deletion_reviewed_at: Option<DateTime<Utc>>,
    /// Why the request was rejected.
    pub rejection_reason: Option<String>,
}

/// Input for recording a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    /// Pupil the payment is for.
    pub pupil_id: PupilId,
    /// Term paid for.
    pub term: TermNumber,
    /// Academic year paid for.
    pub year: i32,
    /// Amount paid.
    pub amount: Decimal,
    /// Receipt or bank reference.
    #[serde(default)]
    pub reference: Option<String>,
}

/// A validated state transition with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentTransition {
    /// Deletion requested.
    RequestDeletion {
        /// Who asked.
        requested_by: UserId,
        /// When.
        requested_at: DateTime<Utc>,
        /// Why.
        reason: String,
    },
    /// Deletion approved.
    ApproveDeletion {
        /// Reviewer.
        approved_by: UserId,
        /// When.
        approved_at: DateTime<Utc>,
    },
    /// Deletion rejected.
    RejectDeletion {
        /// Reviewer.
        rejected_by: UserId,
        /// When.
        rejected_at: DateTime<Utc>,
        /// Why.
        reason: String,
    },
}

impl PaymentTransition {
    /// The operation this transition performs.
    #[must_use]
    pub const fn operation(&self) -> PaymentOperation {
        match self {
            Self::RequestDeletion { .. } => PaymentOperation::SoftDelete,
            Self::ApproveDeletion { .. } => PaymentOperation::ApproveDeletion,
            Self::RejectDeletion { .. } => PaymentOperation::RejectDeletion,
        }
    }

    /// The state the payment ends up in.
    #[must_use]
    pub const fn new_state(&self) -> PaymentState {
        match self {
            Self::RequestDeletion { .. } => PaymentState::PendingDeletion,
            Self::ApproveDeletion { .. } => PaymentState::DeletionApproved,
            Self::RejectDeletion { .. } => PaymentState::DeletionRejected,
        }
    }

    /// The user performing the transition.
    #[must_use]
    pub const fn actor_id(&self) -> UserId {
        match self {
            Self::RequestDeletion { requested_by, .. } => *requested_by,
            Self::ApproveDeletion { approved_by, .. } => *approved_by,
            Self::RejectDeletion { rejected_by, .. } => *rejected_by,
        }
    }

    /// Returns the payment as it looks after the transition.
    ///
    /// A fresh deletion request clears the outcome of any earlier review.
    #[must_use]
    pub fn apply(&self, payment: &Payment) -> Payment {
        let mut next = payment.clone();
        next.state = self.new_state();
        match self {
            Self::RequestDeletion {
                requested_by,
                requested_at,
                reason,
            } => {
                next.deletion_reason = Some(reason.clone());
                next.deletion_requested_by = Some(*requested_by);
                next.deletion_requested_at = Some(*requested_at);
                next.deletion_reviewed_by = None;
                next.deletion_reviewed_at = None;
                next.rejection_reason = None;
            }
            Self::ApproveDeletion {
                approved_by,
                approved_at,
            } => {
                next.deletion_reviewed_by = Some(*approved_by);
                next.deletion_reviewed_at = Some(*approved_at);
            }
            Self::RejectDeletion {
                rejected_by,
                rejected_at,
                reason,
            } => {
                next.deletion_reviewed_by = Some(*rejected_by);
                next.deletion_reviewed_at = Some(*rejected_at);
                next.rejection_reason = Some(reason.clone());
            }
        }
        next
    }
}
