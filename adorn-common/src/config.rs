//! Configuration loading and setting resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Compiled default for the storefront backend base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Compiled default page size for catalog list requests
pub const DEFAULT_PAGE_SIZE: u32 = 60;

/// Optional settings loaded from `config.toml`
///
/// Every field is optional: a missing file or missing key falls back to the
/// compiled defaults instead of failing startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the storefront REST backend
    pub api_base_url: Option<String>,
    /// HTTP port for the builder service
    pub port: Option<u16>,
    /// Page size for catalog list requests
    pub page_size: Option<u32>,
    /// Default tracing filter directive (e.g. "info", "adorn_builder=debug")
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load configuration from an explicit TOML file path
    pub fn load_from(path: &std::path::Path) -> Result<TomlConfig> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::Config(format!("{path:?}: {e}")))
    }

    /// Load configuration from the default platform location
    ///
    /// A missing config file is not an error: returns defaults and logs a
    /// debug message, so zero-config startup always works.
    pub fn load_default() -> TomlConfig {
        let Some(path) = default_config_path() else {
            return TomlConfig::default();
        };
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return TomlConfig::default();
        }
        match TomlConfig::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config file {:?}: {}", path, e);
                TomlConfig::default()
            }
        }
    }
}

/// Default configuration file path for the platform
///
/// `~/.config/adorn/config.toml` on Linux, the equivalent config directory
/// on macOS/Windows.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("adorn").join("config.toml"))
}

/// Resolve the backend base URL following the standard priority order:
/// 1. Command-line argument (highest priority)
/// 2. `ADORN_API_BASE_URL` environment variable
/// 3. TOML config file
/// 4. Compiled default (fallback)
///
/// Trailing slashes are stripped so callers can join paths uniformly.
pub fn resolve_api_base_url(cli_arg: Option<&str>, config: &TomlConfig) -> String {
    let raw = if let Some(url) = cli_arg {
        url.to_string()
    } else if let Ok(url) = std::env::var("ADORN_API_BASE_URL") {
        url
    } else if let Some(url) = &config.api_base_url {
        url.clone()
    } else {
        DEFAULT_API_BASE_URL.to_string()
    };
    raw.trim_end_matches('/').to_string()
}

/// Resolve the catalog page size: CLI > env > TOML > compiled default
pub fn resolve_page_size(cli_arg: Option<u32>, config: &TomlConfig) -> u32 {
    let size = if let Some(size) = cli_arg {
        size
    } else if let Some(size) = std::env::var("ADORN_PAGE_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        size
    } else {
        config.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    };
    // A zero page size would make the backend return empty pages forever
    size.max(1)
}
