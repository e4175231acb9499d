//! Search functionality using tantivy for host inventory indexing and retrieval
//!
//! The module owns the whole index lifecycle: the staleness gate deciding when
//! a rebuild is due, the on-disk index store, and ranked query execution.

pub mod errors;
pub mod freshness;
pub mod query;
pub mod schema;
pub mod store;

pub use errors::{IndexError, QueryError, RefreshError, StateError};
pub use freshness::FreshnessGate;
pub use query::{RESULT_LIMIT, ScoredHost};
pub use schema::HostSchema;
pub use store::{HostIndex, UpsertOutcome};
