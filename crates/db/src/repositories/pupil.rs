//! Pupil and guardian repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use feeledger_core::access::{ActorContext, Permission};
use feeledger_core::audit::{AuditAction, AuditRecord, AuditTable};
use feeledger_core::school::{
    NewParent, NewPupil, Parent, Pupil, PupilStatus, SchoolError, SchoolService,
};
use feeledger_shared::types::{GradeId, ParentId, PupilId};

use crate::entities::{grades, parents, pupil_parents, pupils};
use crate::repositories::audit::AuditRecorder;
use crate::store::{StoreError, StoreSettings, begin_read, begin_write, bounded};

/// Pupil and guardian repository.
#[derive(Debug, Clone)]
pub struct PupilRepository {
    db: DatabaseConnection,
    settings: StoreSettings,
}

impl PupilRepository {
    /// Creates a new pupil repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: StoreSettings) -> Self {
        Self { db, settings }
    }

    /// Registers a pupil in an existing grade.
    pub async fn create_pupil(
        &self,
        input: NewPupil,
        actor: &ActorContext,
    ) -> Result<Pupil, SchoolError> {
        let pupil = SchoolService::new_pupil(input, actor)?;

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            ensure_grade(&txn, pupil.grade_id).await?;

            let now = Utc::now();
            let inserted = pupils::ActiveModel {
                id: Set(pupil.id.into_inner()),
                full_name: Set(pupil.full_name.clone()),
                grade_id: Set(pupil.grade_id.into_inner()),
                status: Set(pupil.status.into()),
                enrolled_at: Set(pupil.enrolled_at),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(StoreError::from)?;
            let created = Pupil::from(inserted);

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Create,
                    AuditTable::Pupils,
                    created.id.into_inner(),
                    actor.actor_id,
                )
                .with_after(&created),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(pupil_id = %created.id, grade_id = %created.grade_id, "pupil registered");
            Ok(created)
        })
        .await
    }

    /// Finds a pupil by id.
    pub async fn get_pupil(
        &self,
        pupil_id: PupilId,
        actor: &ActorContext,
    ) -> Result<Pupil, SchoolError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let row = pupils::Entity::find_by_id(pupil_id.into_inner())
                .one(&self.db)
                .await
                .map_err(StoreError::from)?
                .ok_or(SchoolError::PupilNotFound(pupil_id))?;
            Ok(row.into())
        })
        .await
    }

    /// Changes a pupil's enrolment status.
    pub async fn update_status(
        &self,
        pupil_id: PupilId,
        status: PupilStatus,
        actor: &ActorContext,
    ) -> Result<Pupil, SchoolError> {
        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let before = lock_pupil(&txn, pupil_id).await?;
            let Some(after) = SchoolService::change_status(&before, status, actor)? else {
                txn.commit().await.map_err(StoreError::from)?;
                return Ok(before);
            };

            let updated = save_pupil(&txn, &before, &after, actor).await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(
                pupil_id = %pupil_id,
                from = %before.status,
                to = %after.status,
                "pupil status changed"
            );
            Ok(updated)
        })
        .await
    }

    /// Moves a pupil to another existing grade.
    pub async fn move_grade(
        &self,
        pupil_id: PupilId,
        grade_id: GradeId,
        actor: &ActorContext,
    ) -> Result<Pupil, SchoolError> {
        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let before = lock_pupil(&txn, pupil_id).await?;
            let Some(after) = SchoolService::move_grade(&before, grade_id, actor)? else {
                txn.commit().await.map_err(StoreError::from)?;
                return Ok(before);
            };
            ensure_grade(&txn, grade_id).await?;

            let updated = save_pupil(&txn, &before, &after, actor).await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(pupil_id = %pupil_id, from = %before.grade_id, to = %grade_id, "pupil moved");
            Ok(updated)
        })
        .await
    }

    /// Lists the pupils of a grade by name, in every status.
    pub async fn list_by_grade(
        &self,
        grade_id: GradeId,
        actor: &ActorContext,
    ) -> Result<Vec<Pupil>, SchoolError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            ensure_grade(&txn, grade_id).await?;
            let rows = pupils::Entity::find()
                .filter(pupils::Column::GradeId.eq(grade_id.into_inner()))
                .order_by_asc(pupils::Column::FullName)
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(rows.into_iter().map(Pupil::from).collect())
        })
        .await
    }

    /// Registers a parent or guardian.
    pub async fn create_parent(
        &self,
        input: NewParent,
        actor: &ActorContext,
    ) -> Result<Parent, SchoolError> {
        let parent = SchoolService::new_parent(input, actor)?;

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let inserted = parents::ActiveModel {
                id: Set(parent.id.into_inner()),
                full_name: Set(parent.full_name.clone()),
                phone: Set(parent.phone.clone()),
                email: Set(parent.email.clone()),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(StoreError::from)?;
            let created = Parent::from(inserted);

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Create,
                    AuditTable::Parents,
                    created.id.into_inner(),
                    actor.actor_id,
                )
                .with_after(&created),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(created)
        })
        .await
    }

    /// Links a guardian to a pupil. Linking twice is a no-op.
    pub async fn link_parent(
        &self,
        pupil_id: PupilId,
        parent_id: ParentId,
        relationship: Option<String>,
        actor: &ActorContext,
    ) -> Result<(), SchoolError> {
        actor.require(Permission::ManagePupils)?;
        let relationship = relationship
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            lock_pupil(&txn, pupil_id).await?;
            parents::Entity::find_by_id(parent_id.into_inner())
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(SchoolError::ParentNotFound(parent_id))?;

            let existing = pupil_parents::Entity::find_by_id((
                pupil_id.into_inner(),
                parent_id.into_inner(),
            ))
            .one(&txn)
            .await
            .map_err(StoreError::from)?;
            if existing.is_some() {
                txn.commit().await.map_err(StoreError::from)?;
                return Ok(());
            }

            let link = pupil_parents::ActiveModel {
                pupil_id: Set(pupil_id.into_inner()),
                parent_id: Set(parent_id.into_inner()),
                relationship: Set(relationship),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(StoreError::from)?;

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Create,
                    AuditTable::PupilParents,
                    pupil_id.into_inner(),
                    actor.actor_id,
                )
                .with_after(&link),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(pupil_id = %pupil_id, parent_id = %parent_id, "guardian linked");
            Ok(())
        })
        .await
    }

    /// Lists the guardians of a pupil.
    pub async fn list_parents(
        &self,
        pupil_id: PupilId,
        actor: &ActorContext,
    ) -> Result<Vec<Parent>, SchoolError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            pupils::Entity::find_by_id(pupil_id.into_inner())
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(SchoolError::PupilNotFound(pupil_id))?;

            let parent_ids: Vec<_> = pupil_parents::Entity::find()
                .filter(pupil_parents::Column::PupilId.eq(pupil_id.into_inner()))
                .all(&txn)
                .await
                .map_err(StoreError::from)?
                .into_iter()
                .map(|link| link.parent_id)
                .collect();

            let rows = parents::Entity::find()
                .filter(parents::Column::Id.is_in(parent_ids))
                .order_by_asc(parents::Column::FullName)
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(rows.into_iter().map(Parent::from).collect())
        })
        .await
    }
}

async fn ensure_grade(txn: &DatabaseTransaction, grade_id: GradeId) -> Result<(), SchoolError> {
    grades::Entity::find_by_id(grade_id.into_inner())
        .one(txn)
        .await
        .map_err(StoreError::from)?
        .ok_or(SchoolError::GradeNotFound(grade_id))?;
    Ok(())
}

async fn lock_pupil(txn: &DatabaseTransaction, pupil_id: PupilId) -> Result<Pupil, SchoolError> {
    let row = pupils::Entity::find_by_id(pupil_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(StoreError::from)?
        .ok_or(SchoolError::PupilNotFound(pupil_id))?;
    Ok(row.into())
}

async fn save_pupil(
    txn: &DatabaseTransaction,
    before: &Pupil,
    after: &Pupil,
    actor: &ActorContext,
) -> Result<Pupil, SchoolError> {
    let updated = pupils::ActiveModel {
        id: Set(after.id.into_inner()),
        grade_id: Set(after.grade_id.into_inner()),
        status: Set(after.status.into()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .update(txn)
    .await
    .map_err(StoreError::from)?;

    AuditRecorder::record(
        txn,
        AuditRecord::new(
            AuditAction::Update,
            AuditTable::Pupils,
            after.id.into_inner(),
            actor.actor_id,
        )
        .with_before(before)
        .with_after(after),
    )
    .await?;
    Ok(updated.into())
}
