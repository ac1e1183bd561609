//! Audit record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use feeledger_shared::types::{AuditLogId, UserId};

/// Kind of mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Record inserted.
    Create,
    /// Record fields changed.
    Update,
    /// Payment deletion requested.
    SoftDelete,
    /// Payment deletion approved.
    ApproveDeletion,
    /// Payment deletion rejected.
    RejectDeletion,
    /// Fee structure switched on.
    Activate,
    /// Fee structure switched off.
    Deactivate,
    /// Non-financial record removed.
    Delete,
}

impl AuditAction {
    /// Returns the string stored in the `action_type` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::SoftDelete => "SOFT_DELETE",
            Self::ApproveDeletion => "APPROVE_DELETION",
            Self::RejectDeletion => "REJECT_DELETION",
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
            Self::Delete => "DELETE",
        }
    }

    /// Parses an action from its column value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "SOFT_DELETE" => Some(Self::SoftDelete),
            "APPROVE_DELETION" => Some(Self::ApproveDeletion),
            "REJECT_DELETION" => Some(Self::RejectDeletion),
            "ACTIVATE" => Some(Self::Activate),
            "DEACTIVATE" => Some(Self::Deactivate),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table an audit record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTable {
    /// `grades`
    Grades,
    /// `fee_structures`
    FeeStructures,
    /// `pupils`
    Pupils,
    /// `parents`
    Parents,
    /// `pupil_parents`
    PupilParents,
    /// `payments`
    Payments,
}

impl AuditTable {
    /// Returns the table name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grades => "grades",
            Self::FeeStructures => "fee_structures",
            Self::Pupils => "pupils",
            Self::Parents => "parents",
            Self::PupilParents => "pupil_parents",
            Self::Payments => "payments",
        }
    }
}

impl fmt::Display for AuditTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit record ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// What happened.
    pub action: AuditAction,
    /// Which table was touched.
    pub table: AuditTable,
    /// Primary key of the touched row.
    pub record_id: Uuid,
    /// Who did it.
    pub actor_id: UserId,
    /// Row state before the mutation.
    pub before: Option<serde_json::Value>,
    /// Row state after the mutation.
    pub after: Option<serde_json::Value>,
    /// First snapshot that failed to serialize. The recorder refuses to
    /// append a record carrying one.
    pub snapshot_error: Option<String>,
}

impl AuditRecord {
    /// Creates a record without snapshots.
    #[must_use]
    pub fn new(action: AuditAction, table: AuditTable, record_id: Uuid, actor_id: UserId) -> Self {
        Self {
            action,
            table,
            record_id,
            actor_id,
            before: None,
            after: None,
            snapshot_error: None,
        }
    }

    /// Attaches the pre-mutation snapshot.
    #[must_use]
    pub fn with_before<T: Serialize>(mut self, before: &T) -> Self {
        self.before = self.snapshot(before);
        self
    }

    /// Attaches the post-mutation snapshot.
    #[must_use]
    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after = self.snapshot(after);
        self
    }

    fn snapshot<T: Serialize>(&mut self, value: &T) -> Option<serde_json::Value> {
        match serde_json::to_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                self.snapshot_error.get_or_insert_with(|| err.to_string());
                None
            }
        }
    }
}

/// A persisted audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Entry id.
    pub id: AuditLogId,
    /// What happened.
    pub action: AuditAction,
    /// Table name.
    pub table_name: String,
    /// Primary key of the touched row.
    pub record_id: Uuid,
    /// Who did it.
    pub actor_id: UserId,
    /// Row state before the mutation.
    pub before_snapshot: Option<serde_json::Value>,
    /// Row state after the mutation.
    pub after_snapshot: Option<serde_json::Value>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}
