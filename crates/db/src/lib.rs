//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The schema migration, including the append-only and immutability triggers
//! - Repositories that pair every mutation with its audit entry

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod store;

pub use repositories::{
    AuditLogRepository, AuditRecorder, BalanceRepository, FeeStructureFilter,
    FeeStructureRepository, FeeUpsert, GradeRepository, PaymentRepository, PupilRepository,
};
pub use store::{StoreError, StoreSettings};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use feeledger_shared::config::DatabaseConfig;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}
