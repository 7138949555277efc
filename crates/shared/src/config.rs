//! Application configuration management.
//!
//! Layering: `config/default.toml`, then `config/{RUN_MODE}.toml`, then environment
//! variables prefixed `CODLEDGER` with `__` as the section separator
//! (`CODLEDGER__DATABASE__URL`).

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger and collection settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
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
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger, collection and forecast settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum number of deposit ids accepted by one bulk verification.
    #[serde(default = "default_bulk_deposit_cap")]
    pub bulk_deposit_cap: usize,
    /// Default forecast horizon in days.
    #[serde(default = "default_forecast_days")]
    pub forecast_horizon_days: u32,
    /// Trailing window used for the forecast averages.
    #[serde(default = "default_forecast_days")]
    pub forecast_lookback_days: u32,
    /// Post GL entries when collections and deposits are verified.
    #[serde(default = "default_true")]
    pub post_collection_entries: bool,
    /// Block agents automatically once they hold cash aged four days or more.
    #[serde(default = "default_true")]
    pub auto_block_overdue: bool,
    /// Account codes the collection flow posts against.
    #[serde(default)]
    pub accounts: SystemAccounts,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bulk_deposit_cap: default_bulk_deposit_cap(),
            forecast_horizon_days: default_forecast_days(),
            forecast_lookback_days: default_forecast_days(),
            post_collection_entries: true,
            auto_block_overdue: true,
            accounts: SystemAccounts::default(),
        }
    }
}

fn default_bulk_deposit_cap() -> usize {
    50
}

fn default_forecast_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

/// Chart-of-accounts codes with a fixed role in the collection flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemAccounts {
    /// Cash physically held by the business.
    #[serde(default = "default_cash_in_hand")]
    pub cash_in_hand: String,
    /// Cash collected by agents, not yet verified.
    #[serde(default = "default_cash_in_transit")]
    pub cash_in_transit: String,
    /// Receivable from agents for verified collections.
    #[serde(default = "default_ar_agents")]
    pub ar_agents: String,
    /// Revenue credited when a delivered order's cash is recorded.
    #[serde(default = "default_product_revenue")]
    pub product_revenue: String,
}

impl Default for SystemAccounts {
    fn default() -> Self {
        Self {
            cash_in_hand: default_cash_in_hand(),
            cash_in_transit: default_cash_in_transit(),
            ar_agents: default_ar_agents(),
            product_revenue: default_product_revenue(),
        }
    }
}

fn default_cash_in_hand() -> String {
    "1010".to_string()
}

fn default_cash_in_transit() -> String {
    "1015".to_string()
}

fn default_ar_agents() -> String {
    "1020".to_string()
}

fn default_product_revenue() -> String {
    "4010".to_string()
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or `database.url` is missing.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CODLEDGER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Server bind address as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
