//! `SeaORM` entity definitions.

pub mod audit_logs;
pub mod convert;
pub mod fee_structures;
pub mod grades;
pub mod parents;
pub mod payments;
pub mod pupil_parents;
pub mod pupils;
pub mod sea_orm_active_enums;
