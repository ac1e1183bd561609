//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Payment ledger policy.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Billing calendar (term due dates).
    #[serde(default)]
    pub billing: BillingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a single request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How long to wait for a pooled connection, in seconds.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    /// Bound applied to every store operation, in milliseconds.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_statement_timeout() -> u64 {
    5_000
}

/// Payment ledger policy.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Reject deletion approvals by the recorder or the requester of the deletion.
    #[serde(default = "default_segregation_of_duties")]
    pub segregation_of_duties: bool,
    /// Earliest academic year a payment or fee may target.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Latest academic year a payment or fee may target.
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_segregation_of_duties() -> bool {
    true
}

fn default_min_year() -> i32 {
    2000
}

fn default_max_year() -> i32 {
    2100
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            segregation_of_duties: default_segregation_of_duties(),
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

/// Month/day a term's fees fall due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TermDueConfig {
    /// Calendar month (1-12).
    pub month: u32,
    /// Day of month.
    pub day: u32,
}

/// Billing calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Term 1 due date.
    #[serde(default = "default_term1_due")]
    pub term1: TermDueConfig,
    /// Term 2 due date.
    #[serde(default = "default_term2_due")]
    pub term2: TermDueConfig,
    /// Term 3 due date.
    #[serde(default = "default_term3_due")]
    pub term3: TermDueConfig,
}

fn default_term1_due() -> TermDueConfig {
    TermDueConfig { month: 2, day: 15 }
}

fn default_term2_due() -> TermDueConfig {
    TermDueConfig { month: 6, day: 15 }
}

fn default_term3_due() -> TermDueConfig {
    TermDueConfig { month: 10, day: 15 }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            term1: default_term1_due(),
            term2: default_term2_due(),
            term3: default_term3_due(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FEELEDGER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
