//! Application configuration
//!
//! Configuration is read once at startup from a TOML file under the platform
//! config directory and handed to every component as an explicit struct.
//! There is no ambient config state.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name used under the platform config/cache directories.
pub const APP_NAME: &str = "fleetdex";

/// Errors raised while locating, reading, or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the platform config directory")]
    NoConfigDir,

    #[error("could not determine the platform cache directory")]
    NoCacheDir,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Seconds the on-disk index stays valid before a rebuild is due.
    #[serde(default = "default_ttl")]
    pub ttl: u64,

    /// Index directory name, resolved under the app cache directory.
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// `EnvFilter` directive controlling log verbosity.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional log file name under the app cache directory.
    /// Logs go to stderr when unset.
    #[serde(default)]
    pub log_file: Option<String>,

    /// Upper bound in seconds for the whole discovery pass.
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_secs: u64,

    /// Discovery backends to enable, by name.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Settings for the `aws` provider.
    #[serde(default)]
    pub aws: AwsConfig,
}

/// Settings for the AWS EC2 discovery backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    /// Instance field used as the unique host address.
    #[serde(default = "default_address_field")]
    pub address_field: String,

    /// Filters forwarded to `describe-instances`.
    #[serde(default)]
    pub filters: Vec<AwsFilter>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            address_field: default_address_field(),
            filters: Vec::new(),
        }
    }
}

/// One `describe-instances` filter.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsFilter {
    pub name: String,
    pub values: Vec<String>,
}

fn default_ttl() -> u64 {
    300
}

fn default_index_path() -> String {
    "hosts".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_discovery_timeout() -> u64 {
    30
}

fn default_providers() -> Vec<String> {
    vec!["aws".to_string()]
}

fn default_address_field() -> String {
    "PrivateIpAddress".to_string()
}

impl AppConfig {
    /// Path where the config file is expected, e.g.
    /// `~/.config/fleetdex/config.toml` on Linux.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME).join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// App-scoped cache directory holding the index and refresh state.
    pub fn cache_dir() -> Result<PathBuf, ConfigError> {
        dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(ConfigError::NoCacheDir)
    }

    /// Directory holding the tantivy index files.
    pub fn index_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(Self::cache_dir()?.join(&self.index_path))
    }

    /// File persisting the last-refresh timestamp.
    pub fn state_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(Self::cache_dir()?.join("last_refresh"))
    }

    /// Resolved log file path, if one is configured.
    pub fn log_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        match &self.log_file {
            Some(name) => Ok(Some(Self::cache_dir()?.join(name))),
            None => Ok(None),
        }
    }

    /// Create the cache directory so the gate and index can write under it.
    pub fn ensure_dirs() -> Result<(), ConfigError> {
        let cache = Self::cache_dir()?;
        std::fs::create_dir_all(&cache).map_err(|source| ConfigError::CreateDir {
            path: cache,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let raw = r#"
            ttl = 600
            index_path = "machines"
            log_level = "debug"
            log_file = "fleetdex.log"
            discovery_timeout_secs = 10
            providers = ["aws"]

            [aws]
            address_field = "PublicIpAddress"

            [[aws.filters]]
            name = "instance-state-name"
            values = ["running"]

            [[aws.filters]]
            name = "tag:team"
            values = ["platform", "infra"]
        "#;

        let config: AppConfig = toml::from_str(raw).expect("config should parse");
        assert_eq!(config.ttl, 600);
        assert_eq!(config.index_path, "machines");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file.as_deref(), Some("fleetdex.log"));
        assert_eq!(config.discovery_timeout_secs, 10);
        assert_eq!(config.providers, vec!["aws"]);
        assert_eq!(config.aws.address_field, "PublicIpAddress");
        assert_eq!(config.aws.filters.len(), 2);
        assert_eq!(config.aws.filters[1].values, vec!["platform", "infra"]);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.ttl, 300);
        assert_eq!(config.index_path, "hosts");
        assert_eq!(config.log_level, "info");
        assert!(config.log_file.is_none());
        assert_eq!(config.discovery_timeout_secs, 30);
        assert_eq!(config.providers, vec!["aws"]);
        assert_eq!(config.aws.address_field, "PrivateIpAddress");
        assert!(config.aws.filters.is_empty());
    }

    #[test]
    fn malformed_config_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("ttl = \"soon\"");
        assert!(result.is_err());
    }
}
