//! Configuration resolution
//!
//! Resolves the two provider credentials with ENV → TOML priority at
//! process start. A missing credential is startup-fatal, never a per-call
//! error; Google Books needs no credential.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable carrying the SerpApi key.
pub const SERP_API_KEY_ENV: &str = "SERP_API_KEY";

/// Environment variable carrying the ISBNdb key.
pub const ISBNDB_API_KEY_ENV: &str = "ISBNDB_API_KEY";

/// Environment variable overriding the TOML config file location.
pub const CONFIG_PATH_ENV: &str = "ISBN_ENRICH_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "isbn-enrich.toml";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5740";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(String),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Missing(String),
}

/// On-disk TOML configuration (all fields optional).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub serp_api_key: Option<String>,
    pub isbndb_api_key: Option<String>,
    pub bind_address: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub serp_api_key: String,
    pub isbndb_api_key: String,
    pub bind_address: String,
}

/// Config file location: `ISBN_ENRICH_CONFIG` or `./isbn-enrich.toml`.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the TOML config; a missing file yields the empty default.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig, ConfigError> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Resolve both credentials and the bind address.
///
/// Priority per key: environment variable, then TOML. Either credential
/// missing aborts startup with a remediation message.
pub fn resolve(toml_config: &TomlConfig) -> Result<EnrichConfig, ConfigError> {
    let serp_api_key = resolve_key(
        "SerpApi",
        SERP_API_KEY_ENV,
        toml_config.serp_api_key.as_deref(),
    )?;
    let isbndb_api_key = resolve_key(
        "ISBNdb",
        ISBNDB_API_KEY_ENV,
        toml_config.isbndb_api_key.as_deref(),
    )?;

    let bind_address = toml_config
        .bind_address
        .clone()
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    Ok(EnrichConfig {
        serp_api_key,
        isbndb_api_key,
        bind_address,
    })
}

/// Resolve one API key from ENV → TOML.
pub fn resolve_key(
    label: &str,
    env_var: &str,
    toml_key: Option<&str>,
) -> Result<String, ConfigError> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_key.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in both environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Ok(key.to_string());
    }

    Err(ConfigError::Missing(format!(
        "{} API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: {} ({} = \"your-key\")",
        label,
        env_var,
        config_path().display(),
        env_var.to_lowercase()
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
