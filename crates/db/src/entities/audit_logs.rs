//! `SeaORM` Entity for audit_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AuditAction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub action_type: AuditAction,
    pub table_name: String,
    pub record_id: Uuid,
    pub actor_id: Uuid,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub before_snapshot: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub after_snapshot: Option<Json>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
