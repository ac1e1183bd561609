//! `SeaORM` Entity for pupil_parents link table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pupil_parents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pupil_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub parent_id: Uuid,
    pub relationship: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pupils::Entity",
        from = "Column::PupilId",
        to = "super::pupils::Column::Id"
    )]
    Pupils,
    #[sea_orm(
        belongs_to = "super::parents::Entity",
        from = "Column::ParentId",
        to = "super::parents::Column::Id"
    )]
    Parents,
}

impl Related<super::pupils::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pupils.def()
    }
}

impl Related<super::parents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
