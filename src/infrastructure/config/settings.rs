//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section is optional and
//! falls back to its defaults. `MARKETSYNC_DATABASE` overrides `database`.
//!
//! # Example
//!
//! ```no_run
//! use marketsync::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("marketsync.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::cache::CacheConfig;
use super::ingestion::{FetcherConfig, RateLimitConfig, RetryConfig, MIN_REQUESTS_PER_SECOND};
use super::logging::LoggingConfig;
use crate::adapter::outbound::esi::EsiConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "MARKETSYNC_DATABASE";

/// Highest zstd level accepted for cache payloads.
const MAX_COMPRESSION_LEVEL: i32 = 22;

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "marketsync.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Remote market API connection settings.
    #[serde(default)]
    pub esi: EsiConfig,

    /// Token bucket shared by every remote request.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Backoff for throttled requests.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Page worker pool and per-fetch deadline.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Order cache TTL and compression.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_database_path() -> String {
    "marketsync.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            esi: EsiConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            fetcher: FetcherConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

impl Config {
    /// Parse configuration from TOML content and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for a file that exists.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Apply overrides from `lookup`, usually the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.database = database;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first field that is missing or out of range.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.esi.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" });
        }
        if let Err(err) = Url::parse(&self.esi.base_url) {
            return Err(invalid("base_url", &err.to_string()));
        }
        if self.esi.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "user_agent",
            });
        }
        if self.esi.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be greater than 0"));
        }
        if self.esi.connect_timeout_ms == 0 {
            return Err(invalid("connect_timeout_ms", "must be greater than 0"));
        }

        let rate = self.rate_limit.requests_per_second;
        if !rate.is_finite() || rate < MIN_REQUESTS_PER_SECOND {
            return Err(invalid(
                "requests_per_second",
                &format!("must be a finite number >= {MIN_REQUESTS_PER_SECOND}"),
            ));
        }
        if self.rate_limit.burst == 0 {
            return Err(invalid("burst", "must be greater than 0"));
        }

        if self.retry.initial_backoff_ms == 0 {
            return Err(invalid("initial_backoff_ms", "must be greater than 0"));
        }
        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return Err(invalid("max_backoff_ms", "must be >= initial_backoff_ms"));
        }

        if self.fetcher.workers == 0 {
            return Err(invalid("workers", "must be greater than 0"));
        }
        if self.fetcher.fetch_timeout_secs == 0 {
            return Err(invalid("fetch_timeout_secs", "must be greater than 0"));
        }

        if self.cache.ttl_secs == 0 {
            return Err(invalid("ttl_secs", "must be greater than 0"));
        }
        if !(1..=MAX_COMPRESSION_LEVEL).contains(&self.cache.compression_level) {
            return Err(invalid("compression_level", "must be between 1 and 22"));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("format", "must be \"pretty\" or \"json\""));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" });
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[allow(clippy::result_large_err)]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::Serialize)?)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
