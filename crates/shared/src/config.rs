//! Application configuration management.

use serde::Deserialize;
use uuid::Uuid;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Period closing configuration.
    #[serde(default)]
    pub closing: ClosingConfig,
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

/// Configuration for the scheduled period-closing run.
#[derive(Debug, Clone, Deserialize)]
pub struct ClosingConfig {
    /// Companies to close.
    #[serde(default)]
    pub companies: Vec<Uuid>,
    /// Year to close. With neither year nor month set, the closer closes
    /// last month; with only the month set, the current year is used.
    #[serde(default)]
    pub year: Option<i32>,
    /// Month to close (1-12); the current month when only the year is set.
    #[serde(default)]
    pub month: Option<u32>,
    /// Attempts per company before a transient failure is reported.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ClosingConfig {
    fn default() -> Self {
        Self {
            companies: Vec::new(),
            year: None,
            month: None,
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
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
            .add_source(
                config::Environment::with_prefix("STOCKLEDGER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("closing.companies")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
