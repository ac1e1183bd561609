//! `SeaORM` Entity for payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pupil_id: Uuid,
    pub term_number: i16,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    pub reference: Option<String>,
    pub recorded_at: DateTimeUtc,
    pub recorded_by: Uuid,
    pub state: PaymentState,
    #[sea_orm(column_type = "Text", nullable)]
    pub deletion_reason: Option<String>,
    pub deletion_requested_by: Option<Uuid>,
    pub deletion_requested_at: Option<DateTimeUtc>,
    pub deletion_reviewed_by: Option<Uuid>,
    pub deletion_reviewed_at: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pupils::Entity",
        from = "Column::PupilId",
        to = "super::pupils::Column::Id"
    )]
    Pupils,
}

impl Related<super::pupils::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pupils.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
