//! Payment ledger repository.
//!
//! Each workflow step locks the payment row `FOR UPDATE`, re-validates the
//! transition against the locked state and writes the update and its audit
//! entry in one transaction. A concurrent reviewer therefore blocks on the
//! lock and then sees the committed state.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{info, warn};

use feeledger_core::access::{ActorContext, Permission};
use feeledger_core::audit::{AuditAction, AuditRecord, AuditTable};
use feeledger_core::payment::{
    LedgerError, NewPayment, Payment, PaymentLedger, PaymentTransition,
};
use feeledger_shared::types::{PageRequest, PageResponse, PaymentId, PupilId, TermNumber};

use crate::entities::convert::try_collect;
use crate::entities::sea_orm_active_enums::PaymentState as DbPaymentState;
use crate::entities::{payments, pupils};
use crate::repositories::audit::AuditRecorder;
use crate::store::{StoreError, StoreSettings, begin_read, begin_write, bounded};

/// Payment ledger repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    settings: StoreSettings,
    ledger: PaymentLedger,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        settings: StoreSettings,
        ledger: PaymentLedger,
    ) -> Self {
        Self {
            db,
            settings,
            ledger,
        }
    }

    /// Records an `Active` payment.
    pub async fn record_payment(
        &self,
        input: NewPayment,
        actor: &ActorContext,
    ) -> Result<Payment, LedgerError> {
        let payment = self.ledger.new_payment(input, actor)?;

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            pupils::Entity::find_by_id(payment.pupil_id.into_inner())
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(LedgerError::UnknownPupil(payment.pupil_id))?;

            let now = Utc::now();
            let inserted = payments::ActiveModel {
                id: Set(payment.id.into_inner()),
                pupil_id: Set(payment.pupil_id.into_inner()),
                term_number: Set(payment.term.as_i16()),
                year: Set(payment.year),
                amount: Set(payment.amount),
                reference: Set(payment.reference.clone()),
                recorded_at: Set(payment.recorded_at),
                recorded_by: Set(payment.recorded_by.into_inner()),
                state: Set(DbPaymentState::Active),
                deletion_reason: Set(None),
                deletion_requested_by: Set(None),
                deletion_requested_at: Set(None),
                deletion_reviewed_by: Set(None),
                deletion_reviewed_at: Set(None),
                rejection_reason: Set(None),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(StoreError::from)?;
            let created = Payment::try_from(inserted)?;

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Create,
                    AuditTable::Payments,
                    created.id.into_inner(),
                    actor.actor_id,
                )
                .with_after(&created),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(
                payment_id = %created.id,
                pupil_id = %created.pupil_id,
                term = created.term.get(),
                year = created.year,
                amount = %created.amount,
                "payment recorded"
            );
            Ok(created)
        })
        .await
    }

    /// Requests deletion of a payment.
    pub async fn soft_delete_payment(
        &self,
        payment_id: PaymentId,
        reason: &str,
        actor: &ActorContext,
    ) -> Result<Payment, LedgerError> {
        self.transition(payment_id, actor, |ledger, payment| {
            ledger.soft_delete(payment, reason, actor)
        })
        .await
    }

    /// Approves a pending deletion. The payment stops counting towards
    /// collected totals.
    pub async fn approve_deletion(
        &self,
        payment_id: PaymentId,
        actor: &ActorContext,
    ) -> Result<Payment, LedgerError> {
        self.transition(payment_id, actor, |ledger, payment| {
            ledger.approve_deletion(payment, actor)
        })
        .await
    }

    /// Rejects a pending deletion.
    pub async fn reject_deletion(
        &self,
        payment_id: PaymentId,
        reason: &str,
        actor: &ActorContext,
    ) -> Result<Payment, LedgerError> {
        self.transition(payment_id, actor, |ledger, payment| {
            ledger.reject_deletion(payment, reason, actor)
        })
        .await
    }

    async fn transition<F>(
        &self,
        payment_id: PaymentId,
        actor: &ActorContext,
        decide: F,
    ) -> Result<Payment, LedgerError>
    where
        F: FnOnce(&PaymentLedger, &Payment) -> Result<PaymentTransition, LedgerError>,
    {
        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let row = payments::Entity::find_by_id(payment_id.into_inner())
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(LedgerError::PaymentNotFound(payment_id))?;
            let before = Payment::try_from(row)?;

            let transition = match decide(&self.ledger, &before) {
                Ok(transition) => transition,
                Err(err) => {
                    warn!(
                        payment_id = %payment_id,
                        state = %before.state,
                        error = %err,
                        "payment transition refused"
                    );
                    return Err(err);
                }
            };
            let after = transition.apply(&before);

            let updated = payments::ActiveModel {
                id: Set(after.id.into_inner()),
                state: Set(after.state.into()),
                deletion_reason: Set(after.deletion_reason.clone()),
                deletion_requested_by: Set(after.deletion_requested_by.map(|u| u.into_inner())),
                deletion_requested_at: Set(after.deletion_requested_at),
                deletion_reviewed_by: Set(after.deletion_reviewed_by.map(|u| u.into_inner())),
                deletion_reviewed_at: Set(after.deletion_reviewed_at),
                rejection_reason: Set(after.rejection_reason.clone()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(StoreError::from)?;
            let updated = Payment::try_from(updated)?;

            let operation = transition.operation();
            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    operation.audit_action(),
                    AuditTable::Payments,
                    payment_id.into_inner(),
                    actor.actor_id,
                )
                .with_before(&before)
                .with_after(&updated),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(
                payment_id = %payment_id,
                operation = %operation,
                from = %before.state,
                to = %updated.state,
                actor_id = %actor.actor_id,
                "payment transitioned"
            );
            Ok(updated)
        })
        .await
    }

    /// Finds a payment by id.
    pub async fn get_payment(
        &self,
        payment_id: PaymentId,
        actor: &ActorContext,
    ) -> Result<Payment, LedgerError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let row = payments::Entity::find_by_id(payment_id.into_inner())
                .one(&self.db)
                .await
                .map_err(StoreError::from)?
                .ok_or(LedgerError::PaymentNotFound(payment_id))?;
            Ok(Payment::try_from(row)?)
        })
        .await
    }

    /// Returns the approval queue, oldest request first.
    pub async fn list_pending_deletions(
        &self,
        page: &PageRequest,
        actor: &ActorContext,
    ) -> Result<PageResponse<Payment>, LedgerError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let pending = payments::Entity::find()
                .filter(payments::Column::State.eq(DbPaymentState::PendingDeletion));
            let total = pending
                .clone()
                .count(&txn)
                .await
                .map_err(StoreError::from)?;
            let rows = pending
                .order_by_asc(payments::Column::DeletionRequestedAt)
                .order_by_asc(payments::Column::Id)
                .offset(page.offset())
                .limit(page.limit())
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;

            Ok(PageResponse::for_request(try_collect(rows)?, page, total))
        })
        .await
    }

    /// Lists a pupil's payments in every state, oldest first.
    pub async fn list_payments_for_pupil(
        &self,
        pupil_id: PupilId,
        term: Option<TermNumber>,
        year: Option<i32>,
        actor: &ActorContext,
    ) -> Result<Vec<Payment>, LedgerError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            pupils::Entity::find_by_id(pupil_id.into_inner())
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(LedgerError::UnknownPupil(pupil_id))?;

            let mut query = payments::Entity::find()
                .filter(payments::Column::PupilId.eq(pupil_id.into_inner()));
            if let Some(term) = term {
                query = query.filter(payments::Column::TermNumber.eq(term.as_i16()));
            }
            if let Some(year) = year {
                query = query.filter(payments::Column::Year.eq(year));
            }
            let rows = query
                .order_by_asc(payments::Column::RecordedAt)
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(try_collect(rows)?)
        })
        .await
    }
}

