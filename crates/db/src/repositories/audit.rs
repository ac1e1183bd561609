//! Audit log writes and lookups.
//!
//! Writes always run on the caller's transaction: if the audit insert fails
//! the triggering mutation is rolled back with it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use feeledger_core::access::{ActorContext, Permission};
use feeledger_core::audit::{AuditError, AuditLogEntry, AuditRecord, AuditTable};
use feeledger_shared::types::AuditLogId;

use crate::entities::audit_logs;
use crate::store::{StoreError, StoreSettings, begin_read, bounded};

/// Appends audit records.
pub struct AuditRecorder;

impl AuditRecorder {
    /// Appends one record on `conn`, normally an open write transaction.
    pub async fn record<C>(conn: &C, record: AuditRecord) -> Result<AuditLogEntry, StoreError>
    where
        C: ConnectionTrait,
    {
        if let Some(err) = record.snapshot_error {
            return Err(StoreError::Snapshot(err));
        }
        let row = audit_logs::ActiveModel {
            id: Set(AuditLogId::new().into_inner()),
            action_type: Set(record.action.into()),
            table_name: Set(record.table.as_str().to_string()),
            record_id: Set(record.record_id),
            actor_id: Set(record.actor_id.into_inner()),
            before_snapshot: Set(record.before),
            after_snapshot: Set(record.after),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        debug!(
            action = %record.action,
            table = %record.table,
            record_id = %record.record_id,
            "audit entry appended"
        );
        Ok(row.into())
    }
}

/// Read access to the audit log.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
    settings: StoreSettings,
}

impl AuditLogRepository {
    /// Creates a new audit log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: StoreSettings) -> Self {
        Self { db, settings }
    }

    /// Returns the entries for one record, oldest first.
    pub async fn list_for_record(
        &self,
        table: AuditTable,
        record_id: Uuid,
        actor: &ActorContext,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        actor.require(Permission::ReadLedger)?;
        bounded(self.settings, async {
            let txn = begin_read(&self.db, self.settings).await?;
            let rows = audit_logs::Entity::find()
                .filter(audit_logs::Column::TableName.eq(table.as_str()))
                .filter(audit_logs::Column::RecordId.eq(record_id))
                .order_by_asc(audit_logs::Column::CreatedAt)
                .order_by_asc(audit_logs::Column::Id)
                .all(&txn)
                .await
                .map_err(StoreError::from)?;
            txn.commit().await.map_err(StoreError::from)?;
            Ok(rows.into_iter().map(AuditLogEntry::from).collect())
        })
        .await
    }
}
