//! Transaction setup and time bounds shared by every repository.
//!
//! Writes run in a read-committed transaction with `lock_timeout` and
//! `statement_timeout` set locally; reads run `REPEATABLE READ READ ONLY`
//! so a balance never observes a payment transition without its audit
//! entry. Every call is additionally wrapped in [`tokio::time::timeout`].

use std::future::Future;
use std::time::Duration;

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel,
    TransactionTrait,
};
use thiserror::Error;
use tracing::{error, warn};

use feeledger_core::audit::AuditError;
use feeledger_core::balance::ReconciliationError;
use feeledger_core::fees::FeeError;
use feeledger_core::payment::LedgerError;
use feeledger_core::school::SchoolError;
use feeledger_shared::config::DatabaseConfig;

/// Failure of the store itself, as opposed to a domain rule.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database driver or query error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The operation exceeded its time bound and was abandoned.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// An audit snapshot could not be serialized.
    #[error("Audit snapshot failed: {0}")]
    Snapshot(String),

    /// A row violates an invariant the schema should guarantee.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Returns true if the database reported a unique constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ),
            _ => false,
        }
    }
}

macro_rules! store_error_into {
    ($($target:ty),+ $(,)?) => {
        $(
            impl From<StoreError> for $target {
                fn from(err: StoreError) -> Self {
                    error!(error = %err, "store operation failed");
                    Self::Store(err.to_string())
                }
            }
        )+
    };
}

store_error_into!(LedgerError, FeeError, SchoolError, ReconciliationError, AuditError);

/// Time bounds applied to store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Postgres `statement_timeout` and `lock_timeout`, in milliseconds.
    pub statement_timeout_ms: u64,
    /// Upper bound for a whole repository call.
    pub operation_timeout: Duration,
}

impl StoreSettings {
    /// Derives settings from the database configuration.
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            statement_timeout_ms: config.statement_timeout_ms,
            operation_timeout: Duration::from_millis(config.statement_timeout_ms)
                + Duration::from_secs(config.acquire_timeout_secs),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            statement_timeout_ms: 5_000,
            operation_timeout: Duration::from_secs(10),
        }
    }
}

/// Opens a write transaction with local lock and statement timeouts.
pub async fn begin_write(
    db: &DatabaseConnection,
    settings: StoreSettings,
) -> Result<DatabaseTransaction, StoreError> {
    let txn = db.begin().await?;
    let ms = settings.statement_timeout_ms;
    txn.execute_unprepared(&format!(
        "SET LOCAL statement_timeout = {ms}; SET LOCAL lock_timeout = {ms}"
    ))
    .await?;
    Ok(txn)
}

/// Opens a `REPEATABLE READ READ ONLY` transaction for consistent reads.
pub async fn begin_read(
    db: &DatabaseConnection,
    settings: StoreSettings,
) -> Result<DatabaseTransaction, StoreError> {
    let txn = db
        .begin_with_config(
            Some(IsolationLevel::RepeatableRead),
            Some(AccessMode::ReadOnly),
        )
        .await?;
    let ms = settings.statement_timeout_ms;
    txn.execute_unprepared(&format!("SET LOCAL statement_timeout = {ms}"))
        .await?;
    Ok(txn)
}

/// Runs `operation` under the configured time bound.
///
/// On expiry the future is dropped, which rolls back any open transaction.
pub async fn bounded<T, E, F>(settings: StoreSettings, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<StoreError>,
{
    match tokio::time::timeout(settings.operation_timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                timeout_ms = settings.operation_timeout.as_millis(),
                "store operation timed out"
            );
            Err(StoreError::Timeout(settings.operation_timeout).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = DatabaseConfig {
            url: "postgres://localhost/feeledger".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 3,
            statement_timeout_ms: 2_000,
        };
        let settings = StoreSettings::from_config(&config);
        assert_eq!(settings.statement_timeout_ms, 2_000);
        assert_eq!(settings.operation_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_store_error_maps_to_domain_store_error() {
        let err: LedgerError = StoreError::Timeout(Duration::from_secs(1)).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "STORE_ERROR");
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let settings = StoreSettings {
            statement_timeout_ms: 10,
            operation_timeout: Duration::from_millis(10),
        };
        let result: Result<(), LedgerError> = bounded(settings, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(LedgerError::Store(_))));
    }
}
