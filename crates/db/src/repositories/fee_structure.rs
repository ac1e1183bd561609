//! Fee structure repository.
//!
//! Upserts and reactivations lock the owning grade row before touching the
//! key's structures, so concurrent writers for the same grade serialise and
//! the partial unique index on active rows is never the first line of
//! defence.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use feeledger_core::access::{ActorContext, Permission};
use feeledger_core::audit::{AuditAction, AuditRecord, AuditTable};
use feeledger_core::calendar::YearRange;
use feeledger_core::fees::{FeeCatalog, FeeError, FeeKey, FeeStructure, UpsertPlan};
use feeledger_shared::types::{FeeStructureId, GradeId, TermNumber};

use crate::entities::convert::try_collect;
use crate::entities::{fee_structures, grades};
use crate::repositories::audit::AuditRecorder;
use crate::store::{StoreError, StoreSettings, begin_read, begin_write, bounded};

/// Optional filters for listing fee structures.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeStructureFilter {
    /// Only structures for this grade.
    pub grade_id: Option<GradeId>,
    /// Only structures for this term.
    pub term: Option<TermNumber>,
    /// Only structures for this year.
    pub year: Option<i32>,
    /// Only active structures.
    pub active_only: bool,
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeUpsert {
    /// The structure now active for the key.
    pub structure: FeeStructure,
    /// Structures switched off by this upsert.
    pub deactivated: Vec<FeeStructureId>,
    /// False if the active amount already matched and nothing was written.
    pub changed: bool,
}

/// Fee structure repository.
#[derive(Debug, Clone)]
pub struct FeeStructureRepository {
    db: DatabaseConnection,
    settings: StoreSettings,
    years: YearRange,
}

impl FeeStructureRepository {
    /// Creates a new fee structure repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: StoreSettings, years: YearRange) -> Self {
        Self {
            db,
            settings,
            years,
        }
    }

    /// Returns the active structure for the key.
    ///
    /// `FeeError::NotFound` when none is active; a zero fee is a found fee.
    pub async fn resolve_fee(
        &self,
        grade_id: GradeId,
        term: TermNumber,
        year: i32,
        actor: &ActorContext,
    ) -> Result<FeeStructure, FeeError> {
        actor.require(Permission::ReadLedger)?;
        let key = FeeKey::new(grade_id, term, year);
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let rows = load_key(&txn, key, false).await?;
            txn.commit().await.map_err(StoreError::from)?;
            FeeCatalog::resolve(&rows, key).cloned()
        })
        .await
    }

    /// Makes `amount` the active fee for the key.
    ///
    /// Any other active structure for the key is deactivated in the same
    /// transaction. Upserting the amount already in force writes nothing.
    pub async fn upsert_fee_structure(
        &self,
        grade_id: GradeId,
        term: TermNumber,
        year: i32,
        amount: Decimal,
        actor: &ActorContext,
    ) -> Result<FeeUpsert, FeeError> {
        actor.require(Permission::ManageFees)?;
        let key = FeeKey::new(grade_id, term, year);
        FeeCatalog::validate(key, amount, self.years)?;

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            lock_grade(&txn, grade_id).await?;
            let existing = load_key(&txn, key, true).await?;

            let deactivate = match FeeCatalog::plan_upsert(&existing, key, amount) {
                UpsertPlan::Unchanged(id) => {
                    txn.commit().await.map_err(StoreError::from)?;
                    let structure = existing
                        .into_iter()
                        .find(|s| s.id == id)
                        .ok_or(FeeError::FeeStructureNotFound(id))?;
                    return Ok(FeeUpsert {
                        structure,
                        deactivated: Vec::new(),
                        changed: false,
                    });
                }
                UpsertPlan::Replace { deactivate } => deactivate,
            };

            for id in &deactivate {
                if let Some(before) = existing.iter().find(|s| s.id == *id) {
                    set_active(&txn, before, false, actor).await?;
                }
            }

            let now = Utc::now();
            let inserted = fee_structures::ActiveModel {
                id: Set(FeeStructureId::new().into_inner()),
                grade_id: Set(grade_id.into_inner()),
                term_number: Set(term.as_i16()),
                year: Set(year),
                amount: Set(amount),
                is_active: Set(true),
                created_by: Set(actor.actor_id.into_inner()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(StoreError::from)
            .map_err(|e| duplicate_active(e, key))?;
            let structure = FeeStructure::try_from(inserted)?;

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Create,
                    AuditTable::FeeStructures,
                    structure.id.into_inner(),
                    actor.actor_id,
                )
                .with_after(&structure),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(
                fee_structure_id = %structure.id,
                key = %key,
                amount = %amount,
                replaced = deactivate.len(),
                "fee structure upserted"
            );
            Ok(FeeUpsert {
                structure,
                deactivated: deactivate,
                changed: true,
            })
        })
        .await
    }

    /// Switches a structure on or off.
    ///
    /// Reactivating deactivates every other active structure for the key
    /// first.
    pub async fn set_fee_structure_active(
        &self,
        id: FeeStructureId,
        active: bool,
        actor: &ActorContext,
    ) -> Result<FeeStructure, FeeError> {
        actor.require(Permission::ManageFees)?;

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let row = fee_structures::Entity::find_by_id(id.into_inner())
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(FeeError::FeeStructureNotFound(id))?;
            let target = FeeStructure::try_from(row)?;
            lock_grade(&txn, target.grade_id).await?;

            let existing = load_key(&txn, target.key(), true).await?;
            let target = existing
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or(FeeError::FeeStructureNotFound(id))?;
            if target.is_active == active {
                txn.commit().await.map_err(StoreError::from)?;
                return Ok(target);
            }

            if active {
                for conflict in FeeCatalog::conflicts_for_activation(&existing, &target) {
                    if let Some(before) = existing.iter().find(|s| s.id == conflict) {
                        set_active(&txn, before, false, actor).await?;
                    }
                }
            }
            let updated = set_active(&txn, &target, active, actor).await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(fee_structure_id = %id, active, "fee structure toggled");
            Ok(updated)
        })
        .await
    }

    /// Finds a structure by id.
    pub async fn get_fee_structure(
        &self,
        id: FeeStructureId,
        actor: &ActorContext,
    ) -> Result<FeeStructure, FeeError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let row = fee_structures::Entity::find_by_id(id.into_inner())
                .one(&self.db)
                .await
                .map_err(StoreError::from)?
                .ok_or(FeeError::FeeStructureNotFound(id))?;
            Ok(FeeStructure::try_from(row)?)
        })
        .await
    }

    /// Lists structures matching `filter`, newest year first.
    pub async fn list_fee_structures(
        &self,
        filter: FeeStructureFilter,
        actor: &ActorContext,
    ) -> Result<Vec<FeeStructure>, FeeError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let mut query = fee_structures::Entity::find();
            if let Some(grade_id) = filter.grade_id {
                query = query.filter(fee_structures::Column::GradeId.eq(grade_id.into_inner()));
            }
            if let Some(term) = filter.term {
                query = query.filter(fee_structures::Column::TermNumber.eq(term.as_i16()));
            }
            if let Some(year) = filter.year {
                query = query.filter(fee_structures::Column::Year.eq(year));
            }
            if filter.active_only {
                query = query.filter(fee_structures::Column::IsActive.eq(true));
            }

            let rows = query
                .order_by_desc(fee_structures::Column::Year)
                .order_by_asc(fee_structures::Column::GradeId)
                .order_by_asc(fee_structures::Column::TermNumber)
                .order_by_desc(fee_structures::Column::CreatedAt)
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(try_collect(rows)?)
        })
        .await
    }
}

async fn lock_grade(txn: &DatabaseTransaction, grade_id: GradeId) -> Result<(), FeeError> {
    grades::Entity::find_by_id(grade_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(StoreError::from)?
        .ok_or(FeeError::GradeNotFound(grade_id))?;
    Ok(())
}

/// Loads every structure for the key, optionally locking the rows.
async fn load_key(
    txn: &DatabaseTransaction,
    key: FeeKey,
    lock: bool,
) -> Result<Vec<FeeStructure>, StoreError> {
    let mut query = fee_structures::Entity::find()
        .filter(fee_structures::Column::GradeId.eq(key.grade_id.into_inner()))
        .filter(fee_structures::Column::TermNumber.eq(key.term.as_i16()))
        .filter(fee_structures::Column::Year.eq(key.year))
        .order_by_asc(fee_structures::Column::CreatedAt);
    if lock {
        query = query.lock_exclusive();
    }
    try_collect(query.all(txn).await?)
}

async fn set_active(
    txn: &DatabaseTransaction,
    before: &FeeStructure,
    active: bool,
    actor: &ActorContext,
) -> Result<FeeStructure, FeeError> {
    let row = fee_structures::ActiveModel {
        id: Set(before.id.into_inner()),
        is_active: Set(active),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .update(txn)
    .await
    .map_err(StoreError::from)
    .map_err(|e| duplicate_active(e, before.key()))?;
    let after = FeeStructure::try_from(row)?;

    let action = if active {
        AuditAction::Activate
    } else {
        AuditAction::Deactivate
    };
    AuditRecorder::record(
        txn,
        AuditRecord::new(
            action,
            AuditTable::FeeStructures,
            after.id.into_inner(),
            actor.actor_id,
        )
        .with_before(before)
        .with_after(&after),
    )
    .await?;
    Ok(after)
}

fn duplicate_active(err: StoreError, key: FeeKey) -> FeeError {
    if err.is_unique_violation() {
        FeeError::DuplicateActive(key)
    } else {
        err.into()
    }
}
