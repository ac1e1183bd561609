//! `SeaORM` Entity for parents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "parents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pupil_parents::Entity")]
    PupilParents,
}

impl Related<super::pupil_parents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PupilParents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
