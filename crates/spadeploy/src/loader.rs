//! Reads environment configuration records from disk.

use std::path::{Path, PathBuf};

use spadeploy_core::config::{self, ConfigError, EnvironmentConfig, EnvironmentName};

/// Path of the record for `environment` inside `config_dir`.
pub fn config_path(config_dir: &Path, environment: EnvironmentName) -> PathBuf {
    config_dir.join(environment.file_name())
}

/// Loads exactly `<config_dir>/<environment>.json` without validating it.
pub fn load(config_dir: &Path, environment: EnvironmentName) -> config::Result<EnvironmentConfig> {
    let path = config_path(config_dir, environment);
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::Missing { path: path.clone() },
        _ => ConfigError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        },
    })?;

    let config = config::parse(&path, &contents, environment)?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Loads, applies the region override, and validates.
pub fn load_validated(
    config_dir: &Path,
    environment: EnvironmentName,
    region: Option<&str>,
) -> config::Result<EnvironmentConfig> {
    let mut config = load(config_dir, environment)?;
    if let Some(region) = region {
        tracing::info!(from = %config.region, to = %region, "overriding region");
        config = config.with_region(region);
    }
    config::validate(&config)?;
    Ok(config)
}
