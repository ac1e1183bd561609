//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the registry, fee catalog, payment ledger and reports
//! - The actor extractor reading the upstream identity headers
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use feeledger_core::calendar::{DuePolicy, TermDueDates, YearRange};
use feeledger_core::payment::{LedgerPolicy, PaymentLedger};
use feeledger_db::{
    AuditLogRepository, BalanceRepository, FeeStructureRepository, GradeRepository,
    PaymentRepository, PupilRepository, StoreSettings,
};
use feeledger_shared::AppConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Grade repository.
    pub grades: GradeRepository,
    /// Pupil and guardian repository.
    pub pupils: PupilRepository,
    /// Fee catalog repository.
    pub fees: FeeStructureRepository,
    /// Payment ledger repository.
    pub payments: PaymentRepository,
    /// Balance and report repository.
    pub balances: BalanceRepository,
    /// Audit log reads.
    pub audit: AuditLogRepository,
}

impl AppState {
    /// Wires the repositories from configuration.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let settings = StoreSettings::from_config(&config.database);
        let years = YearRange::from(&config.ledger);
        let ledger = PaymentLedger::new(LedgerPolicy::from(&config.ledger));
        let due: Arc<dyn DuePolicy> = Arc::new(TermDueDates::from(&config.billing));

        Self {
            grades: GradeRepository::new(db.clone(), settings),
            pupils: PupilRepository::new(db.clone(), settings),
            fees: FeeStructureRepository::new(db.clone(), settings, years),
            payments: PaymentRepository::new(db.clone(), settings, ledger),
            balances: BalanceRepository::new(db.clone(), settings, years, due),
            audit: AuditLogRepository::new(db.clone(), settings),
            db: Arc::new(db),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
