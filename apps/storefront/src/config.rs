//! # Configuration
//!
//! Loaded once at startup, read-only afterwards.
//!
//! ## Sources (later overrides earlier)
//! ```text
//! 1. Defaults (this file)
//! 2. storefront.toml in the platform config dir, or --config <path>
//! 3. STOREFRONT_* environment variables (STOREFRONT_API_URL, ...)
//! ```
//!
//! ## Example `storefront.toml`
//! ```toml
//! api_url = "https://shop.example"
//! request_timeout_secs = 10
//! platform_fee = 20
//! free_fee_above = 499
//! currency_symbol = "₹"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use storefront_core::{FeeSchedule, Money};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "STOREFRONT";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

/// Database file name inside the data directory.
pub const DATABASE_FILE_NAME: &str = "storefront.db";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a data directory; set STOREFRONT_DATA_DIR")]
    NoDataDir,

    #[error("Could not create {path}: {reason}")]
    Io { path: String, reason: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Backend origin.
    pub api_url: String,

    pub request_timeout_secs: u64,

    /// Where `storefront.db` lives. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Platform fee applied to guest cart summaries.
    pub platform_fee: Money,

    /// Guest subtotal at which the fee is waived.
    #[serde(default)]
    pub free_fee_above: Option<Money>,

    pub currency_symbol: String,

    /// `RUST_LOG`-style filter used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Loads defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(dirs) = project_dirs() {
                    let default_file = dirs.config_dir().join(CONFIG_FILE_NAME);
                    builder = builder.add_source(File::from(default_file).required(false));
                }
            }
        }

        let config: AppConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("request_timeout_secs", 15)?
            .set_default("platform_fee", 20)?
            .set_default("currency_symbol", "₹")?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".to_string()));
        }
        if self.platform_fee.is_negative() {
            return Err(ConfigError::Invalid("platform_fee cannot be negative".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule {
            platform_fee: self.platform_fee,
            free_above: self.free_fee_above,
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Resolves (and creates) the data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(ConfigError::NoDataDir)?,
        };

        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::Io {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(dir)
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.resolve_data_dir()?.join(DATABASE_FILE_NAME))
    }
}

/// Platform directories.
///
/// - **Linux**: `~/.config/storefront`, `~/.local/share/storefront`
/// - **macOS**: `~/Library/Application Support/in.storefront.storefront`
/// - **Windows**: `%APPDATA%\storefront\storefront`
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("in", "storefront", "storefront")
}
