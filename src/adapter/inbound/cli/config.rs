//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Execute `config show`.
pub fn execute_show(config: &Config, path: &Path, from_file: bool) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "path": path.display().to_string(),
            "from_file": from_file,
            "config": config,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Effective Configuration");
    output::field("Path", path.display());
    if !from_file {
        output::note("(file not found, showing defaults)");
    }
    output::field("Database", &config.database);
    output::field("ESI", &config.esi.base_url);
    output::field(
        "Rate limit",
        format!(
            "{} req/s, burst {}",
            config.rate_limit.requests_per_second, config.rate_limit.burst
        ),
    );
    output::field(
        "Retry",
        format!(
            "{} retries, {}ms..{}ms",
            config.retry.max_retries, config.retry.initial_backoff_ms, config.retry.max_backoff_ms
        ),
    );
    output::field(
        "Fetcher",
        format!(
            "{} workers, {}s deadline",
            config.fetcher.workers, config.fetcher.fetch_timeout_secs
        ),
    );
    output::field(
        "Cache",
        format!(
            "{}s TTL, zstd level {}",
            config.cache.ttl_secs, config.cache.compression_level
        ),
    );

    output::section("TOML");
    output::lines(&config.to_toml()?);
    Ok(())
}

/// Execute `config validate`.
///
/// Parsing already validated `config`; this re-checks it and reports.
pub fn execute_validate(config: &Config, path: &Path, from_file: bool) -> Result<()> {
    if !from_file {
        return Err(ConfigError::ReadFile(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        ))
        .into());
    }
    config.validate()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
        }));
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", path.display());
    output::success("Config file is valid");
    output::field(
        "Next",
        format!("marketsync config show -c {}", path.display()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::PathBuf;

    #[test]
    fn validate_without_file_fails() {
        let err = execute_validate(&Config::default(), &PathBuf::from("absent.toml"), false)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
    }

    #[test]
    fn validate_rejects_invalid_values() {
        let mut config = Config::default();
        config.fetcher.workers = 0;
        let err = execute_validate(&config, &PathBuf::from("m.toml"), true).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "workers", .. })
        ));
    }
}
