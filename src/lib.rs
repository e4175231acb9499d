//! Host discovery and full-text inventory search backing the `fleetdex` CLI.
//!
//! The crate discovers machines from cloud providers, maintains a TTL-guarded
//! tantivy index of them on disk, and answers ranked multi-field queries
//! against that index so an operator can pick a host to connect to.

pub mod config;
pub mod discovery;
pub mod picker;
pub mod search;

pub use config::{AppConfig, ConfigError};
pub use discovery::{DiscoveryError, HostRecord, RecordSource, discover_all, sources_from_config};
pub use search::{
    FreshnessGate, HostIndex, IndexError, QueryError, RefreshError, ScoredHost, StateError,
    UpsertOutcome,
};
