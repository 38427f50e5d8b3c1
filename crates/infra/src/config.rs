//! Configuration loading.
//!
//! Layers, lowest precedence first: built-in defaults, `config/default.toml`,
//! `config/{RUN_ENV}.toml`, then `STOCKTALLY__*` environment variables
//! (e.g. `STOCKTALLY__JWT_SECRET`, `STOCKTALLY__STORAGE=postgres`).

use std::env;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const ENV_PREFIX: &str = "STOCKTALLY";
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// Which `config/{run_env}.toml` overlay was applied.
    pub run_env: String,

    /// Socket address the HTTP server listens on.
    pub bind_addr: String,

    /// Shared HS256 secret for verifying bearer tokens.
    pub jwt_secret: String,

    pub storage: StorageBackend,

    /// Required when `storage = "postgres"`.
    #[serde(default)]
    pub database_url: Option<String>,

    pub db_max_connections: u32,

    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("run_env", &self.run_env)
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("storage", &self.storage)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters"
            )));
        }
        if self.storage == StorageBackend::Postgres
            && self.database_url.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "database_url is required when storage is postgres".to_string(),
            ));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "db_max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder pre-seeded with defaults. `jwt_secret` has none.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("run_env", DEFAULT_ENV)?
        .set_default("bind_addr", "0.0.0.0:8080")?
        .set_default("storage", "memory")?
        .set_default("db_max_connections", 10)?
        .set_default("log_level", "info")?
        .set_default("log_json", true)?)
}

/// Finish a builder into a validated [`AppConfig`].
pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let config = builder.build()?;
    if config.get_string("jwt_secret").is_err() {
        return Err(ConfigError::Invalid(format!(
            "jwt_secret is required; set {ENV_PREFIX}__JWT_SECRET"
        )));
    }
    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Load configuration from files and environment.
///
/// Runs before logging is initialised, so nothing here logs; the result
/// carries `run_env` for the caller to report.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let builder = defaults()?
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .set_override("run_env", run_env)?;

    from_builder(builder)
}
