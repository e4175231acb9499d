//! Discovery of host records from cloud inventory backends
//!
//! Each backend implements [`RecordSource`]; the rest of the crate depends
//! only on that trait and the [`HostRecord`] output contract.

pub mod aws;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::AppConfig;

pub use aws::AwsRecordSource;

/// One discoverable machine, as reported by a provider for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Unique host identifier, an IP address. Never empty.
    pub address: String,
    /// Display label. May be empty.
    pub name: String,
    /// Free-text provider metadata, indexed as one searchable blob.
    pub tags: Vec<String>,
}

/// Errors raised while enumerating hosts. All of them abort the run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("provider '{0}' is not recognized")]
    UnknownProvider(String),

    #[error("unsupported address field '{0}' (expected PrivateIpAddress or PublicIpAddress)")]
    UnknownAddressField(String),

    #[error("provider {provider} could not be launched: {source}")]
    Spawn {
        provider: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("provider {provider} failed: {stderr}")]
    Provider {
        provider: &'static str,
        stderr: String,
    },

    #[error("provider {provider} returned malformed output: {source}")]
    Malformed {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("discovery did not finish within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// A discovery backend capable of listing running hosts.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Backend name as used in the `providers` config list.
    fn name(&self) -> &'static str;

    /// Enumerate the currently discoverable hosts.
    async fn lookup(&self) -> Result<Vec<HostRecord>, DiscoveryError>;
}

impl std::fmt::Debug for dyn RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSource")
            .field("name", &self.name())
            .finish()
    }
}

/// Build the enabled record sources from configuration.
///
/// Unknown provider names fail fast; an empty `providers` list yields an
/// empty source set and an empty discovery result.
pub fn sources_from_config(
    config: &AppConfig,
) -> Result<Vec<Box<dyn RecordSource>>, DiscoveryError> {
    let mut sources: Vec<Box<dyn RecordSource>> = Vec::with_capacity(config.providers.len());
    for provider in &config.providers {
        match provider.as_str() {
            "aws" => sources.push(Box::new(AwsRecordSource::new(config.aws.clone())?)),
            other => return Err(DiscoveryError::UnknownProvider(other.to_string())),
        }
    }
    Ok(sources)
}

/// Run every source in turn, bounded by a single overall deadline.
pub async fn discover_all(
    sources: &[Box<dyn RecordSource>],
    timeout: Duration,
) -> Result<Vec<HostRecord>, DiscoveryError> {
    let lookups = async {
        let mut records = Vec::new();
        for source in sources {
            let found = source.lookup().await?;
            tracing::info!(
                provider = source.name(),
                count = found.len(),
                "provider lookup finished"
            );
            records.extend(found);
        }
        Ok(records)
    };

    match tokio::time::timeout(timeout, lookups).await {
        Ok(result) => result,
        Err(_) => Err(DiscoveryError::Timeout {
            timeout_secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config_with_providers(providers: &[&str]) -> AppConfig {
        let mut config: AppConfig = toml::from_str("").expect("defaults should parse");
        config.providers = providers.iter().map(|p| (*p).to_string()).collect();
        config
    }

    #[test]
    fn known_provider_builds() {
        let sources = sources_from_config(&config_with_providers(&["aws"]))
            .expect("aws provider should build");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name(), "aws");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = sources_from_config(&config_with_providers(&["azure"]))
            .expect_err("unknown provider should fail");
        assert!(matches!(err, DiscoveryError::UnknownProvider(name) if name == "azure"));
    }

    #[test]
    fn no_providers_yields_no_sources() {
        let sources = sources_from_config(&config_with_providers(&[]))
            .expect("empty provider list is valid");
        assert!(sources.is_empty());
    }
}
