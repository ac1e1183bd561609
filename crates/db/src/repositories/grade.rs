//! Grade repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use feeledger_core::access::{ActorContext, Permission};
use feeledger_core::audit::{AuditAction, AuditRecord, AuditTable};
use feeledger_core::school::{Grade, GradeDependents, SchoolError, SchoolService};
use feeledger_shared::types::GradeId;

use crate::entities::{fee_structures, grades, pupils};
use crate::repositories::audit::AuditRecorder;
use crate::store::{StoreError, StoreSettings, begin_read, begin_write, bounded};

/// Grade repository.
#[derive(Debug, Clone)]
pub struct GradeRepository {
    db: DatabaseConnection,
    settings: StoreSettings,
}

impl GradeRepository {
    /// Creates a new grade repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: StoreSettings) -> Self {
        Self { db, settings }
    }

    /// Creates a grade.
    pub async fn create_grade(
        &self,
        name: &str,
        actor: &ActorContext,
    ) -> Result<Grade, SchoolError> {
        let grade = SchoolService::new_grade(name, actor)?;

        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let now = Utc::now();
            let inserted = grades::ActiveModel {
                id: Set(grade.id.into_inner()),
                name: Set(grade.name.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(StoreError::from)
            .map_err(|e| duplicate_name(e, &grade.name))?;
            let created = Grade::from(inserted);

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Create,
                    AuditTable::Grades,
                    created.id.into_inner(),
                    actor.actor_id,
                )
                .with_after(&created),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(grade_id = %created.id, name = %created.name, "grade created");
            Ok(created)
        })
        .await
    }

    /// Renames a grade.
    pub async fn rename_grade(
        &self,
        grade_id: GradeId,
        name: &str,
        actor: &ActorContext,
    ) -> Result<Grade, SchoolError> {
        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let row = grades::Entity::find_by_id(grade_id.into_inner())
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(SchoolError::GradeNotFound(grade_id))?;
            let before = Grade::from(row.clone());
            let renamed = SchoolService::rename_grade(&before, name, actor)?;
            if renamed.name == before.name {
                txn.commit().await.map_err(StoreError::from)?;
                return Ok(before);
            }

            let mut active: grades::ActiveModel = row.into();
            active.name = Set(renamed.name.clone());
            active.updated_at = Set(Utc::now());
            active
                .update(&txn)
                .await
                .map_err(StoreError::from)
                .map_err(|e| duplicate_name(e, &renamed.name))?;

            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Update,
                    AuditTable::Grades,
                    grade_id.into_inner(),
                    actor.actor_id,
                )
                .with_before(&before)
                .with_after(&renamed),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(grade_id = %grade_id, from = %before.name, to = %renamed.name, "grade renamed");
            Ok(renamed)
        })
        .await
    }

    /// Deletes a grade that nothing references.
    pub async fn delete_grade(
        &self,
        grade_id: GradeId,
        actor: &ActorContext,
    ) -> Result<(), SchoolError> {
        bounded(self.settings, async {
            let txn = begin_write(&self.db, self.settings).await?;
            let row = grades::Entity::find_by_id(grade_id.into_inner())
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(StoreError::from)?
                .ok_or(SchoolError::GradeNotFound(grade_id))?;

            let dependents = GradeDependents {
                pupils: pupils::Entity::find()
                    .filter(pupils::Column::GradeId.eq(grade_id.into_inner()))
                    .count(&txn)
                    .await
                    .map_err(StoreError::from)?,
                fee_structures: fee_structures::Entity::find()
                    .filter(fee_structures::Column::GradeId.eq(grade_id.into_inner()))
                    .count(&txn)
                    .await
                    .map_err(StoreError::from)?,
            };
            SchoolService::ensure_grade_deletable(grade_id, dependents, actor)?;

            let before = Grade::from(row.clone());
            row.delete(&txn).await.map_err(StoreError::from)?;
            AuditRecorder::record(
                &txn,
                AuditRecord::new(
                    AuditAction::Delete,
                    AuditTable::Grades,
                    grade_id.into_inner(),
                    actor.actor_id,
                )
                .with_before(&before),
            )
            .await?;
            txn.commit().await.map_err(StoreError::from)?;

            info!(grade_id = %grade_id, "grade deleted");
            Ok(())
        })
        .await
    }

    /// Finds a grade by id.
    pub async fn get_grade(
        &self,
        grade_id: GradeId,
        actor: &ActorContext,
    ) -> Result<Grade, SchoolError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let row = grades::Entity::find_by_id(grade_id.into_inner())
                .one(&self.db)
                .await
                .map_err(StoreError::from)?
                .ok_or(SchoolError::GradeNotFound(grade_id))?;
            Ok(row.into())
        })
        .await
    }

    /// Lists all grades by name.
    pub async fn list_grades(&self, actor: &ActorContext) -> Result<Vec<Grade>, SchoolError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let rows = grades::Entity::find()
                .order_by_asc(grades::Column::Name)
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(rows.into_iter().map(Grade::from).collect())
        })
        .await
    }
}

fn duplicate_name(err: StoreError, name: &str) -> SchoolError {
    if err.is_unique_violation() {
        SchoolError::DuplicateGradeName(name.to_string())
    } else {
        err.into()
    }
}
