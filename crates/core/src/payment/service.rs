//! Payment ledger service.
//!
//! Validates new payments and the soft-delete workflow. The service never
//! touches the store: repositories load the locked row, ask the ledger for
//! a [`PaymentTransition`] and persist it together with its audit entry.

use chrono::Utc;
use rust_decimal::Decimal;

use feeledger_shared::config::LedgerConfig;
use feeledger_shared::types::{PaymentId, to_money};

use crate::access::{ActorContext, Permission};
use crate::calendar::YearRange;
use crate::payment::error::LedgerError;
use crate::payment::types::{
    NewPayment, Payment, PaymentOperation, PaymentState, PaymentTransition,
};

const MAX_REFERENCE_LEN: usize = 64;
const MAX_REASON_LEN: usize = 500;

/// Ledger rules that vary by deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// Reviewer must differ from the recorder and the deletion requester.
    pub segregation_of_duties: bool,
    /// Years payments may be recorded for.
    pub years: YearRange,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for LedgerPolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            segregation_of_duties: config.segregation_of_duties,
            years: YearRange::from(config),
        }
    }
}

/// Stateless payment ledger rules, parameterised by [`LedgerPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentLedger {
    policy: LedgerPolicy,
}

impl PaymentLedger {
    /// Creates a ledger with the given policy.
    #[must_use]
    pub const fn new(policy: LedgerPolicy) -> Self {
        Self { policy }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Builds a new `Active` payment.
    ///
    /// Pupil existence is checked by the store, which reports
    /// [`LedgerError::UnknownPupil`].
    pub fn new_payment(
        &self,
        input: NewPayment,
        actor: &ActorContext,
    ) -> Result<Payment, LedgerError> {
        actor.require(Permission::RecordPayment)?;

        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(input.amount));
        }
        let amount = to_money(input.amount)?;
        let years = self.policy.years;
        if !years.contains(input.year) {
            return Err(LedgerError::YearOutOfRange {
                year: input.year,
                min: years.min,
                max: years.max,
            });
        }

        let reference = input
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if let Some(reference) = &reference
            && reference.chars().count() > MAX_REFERENCE_LEN
        {
            return Err(LedgerError::Validation(format!(
                "Reference must be at most {MAX_REFERENCE_LEN} characters"
            )));
        }

        Ok(Payment {
            id: PaymentId::new(),
            pupil_id: input.pupil_id,
            term: input.term,
            year: input.year,
            amount,
            reference,
            recorded_at: Utc::now(),
            recorded_by: actor.actor_id,
            state: PaymentState::Active,
            deletion_reason: None,
            deletion_requested_by: None,
            deletion_requested_at: None,
            deletion_reviewed_by: None,
            deletion_reviewed_at: None,
            rejection_reason: None,
        })
    }

    /// Requests deletion of an `Active` or `DeletionRejected` payment.
    ///
    /// # Returns
    /// * `Ok(PaymentTransition::RequestDeletion)` if the transition is valid
    /// * `Err(LedgerError::InvalidState)` from any other state
    /// * `Err(LedgerError::ReasonRequired)` if `reason` is blank
    pub fn soft_delete(
        &self,
        payment: &Payment,
        reason: &str,
        actor: &ActorContext,
    ) -> Result<PaymentTransition, LedgerError> {
        actor.require(Permission::RequestPaymentDeletion)?;
        Self::check_state(payment, PaymentOperation::SoftDelete)?;
        let reason = Self::reason(reason, PaymentOperation::SoftDelete)?;

        Ok(PaymentTransition::RequestDeletion {
            requested_by: actor.actor_id,
            requested_at: Utc::now(),
            reason,
        })
    }

    /// Approves a pending deletion.
    ///
    /// The state check runs before the segregation check, so a second
    /// approval of the same payment always reports `InvalidState`.
    pub fn approve_deletion(
        &self,
        payment: &Payment,
        actor: &ActorContext,
    ) -> Result<PaymentTransition, LedgerError> {
        actor.require(Permission::ReviewPaymentDeletion)?;
        Self::check_state(payment, PaymentOperation::ApproveDeletion)?;
        self.check_segregation(payment, actor, PaymentOperation::ApproveDeletion)?;

        Ok(PaymentTransition::ApproveDeletion {
            approved_by: actor.actor_id,
            approved_at: Utc::now(),
        })
    }

    /// Rejects a pending deletion, returning the payment to force.
    pub fn reject_deletion(
        &self,
        payment: &Payment,
        reason: &str,
        actor: &ActorContext,
    ) -> Result<PaymentTransition, LedgerError> {
        actor.require(Permission::ReviewPaymentDeletion)?;
        Self::check_state(payment, PaymentOperation::RejectDeletion)?;
        let reason = Self::reason(reason, PaymentOperation::RejectDeletion)?;

        Ok(PaymentTransition::RejectDeletion {
            rejected_by: actor.actor_id,
            rejected_at: Utc::now(),
            reason,
        })
    }

    /// Returns true if `op` is allowed from `from`.
    #[must_use]
    pub const fn is_valid_transition(from: PaymentState, op: PaymentOperation) -> bool {
        from.next(op).is_some()
    }

    fn check_state(payment: &Payment, operation: PaymentOperation) -> Result<(), LedgerError> {
        if Self::is_valid_transition(payment.state, operation) {
            Ok(())
        } else {
            Err(LedgerError::InvalidState {
                payment_id: payment.id,
                state: payment.state,
                operation,
            })
        }
    }

    fn check_segregation(
        &self,
        payment: &Payment,
        actor: &ActorContext,
        operation: PaymentOperation,
    ) -> Result<(), LedgerError> {
        if !self.policy.segregation_of_duties {
            return Ok(());
        }
        let involved = payment.recorded_by == actor.actor_id
            || payment.deletion_requested_by == Some(actor.actor_id);
        if involved {
            return Err(LedgerError::SegregationOfDuties {
                actor_id: actor.actor_id,
                operation,
            });
        }
        Ok(())
    }

    fn reason(reason: &str, operation: PaymentOperation) -> Result<String, LedgerError> {
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::ReasonRequired(operation));
        }
        if trimmed.chars().count() > MAX_REASON_LEN {
            return Err(LedgerError::Validation(format!(
                "Reason must be at most {MAX_REASON_LEN} characters"
            )));
        }
        Ok(trimmed.to_string())
    }
}
