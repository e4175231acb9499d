//! Error types for the index lifecycle
//!
//! State and index failures are fatal to the run; only query parsing is
//! recoverable (the caller reports zero results instead of aborting).

use std::path::PathBuf;
use tantivy::TantivyError;
use tantivy::query::QueryParserError;
use thiserror::Error;

/// Refresh-state persistence failed. Staleness cannot be determined safely,
/// so these abort the run. A corrupt state *value* is not an error — it falls
/// back to the stale sentinel instead.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read refresh state {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write refresh state {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The on-disk index is unusable.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to create index directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open search index at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: TantivyError,
    },

    #[error("failed to create search index at {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: TantivyError,
    },

    #[error("failed to acquire index writer: {0}")]
    Writer(#[source] TantivyError),

    #[error("failed to add document to index: {0}")]
    Write(#[source] TantivyError),

    #[error("failed to commit index changes: {0}")]
    Commit(#[source] TantivyError),

    #[error("failed to open index reader: {0}")]
    Reader(#[source] TantivyError),

    #[error("failed to reload index reader: {0}")]
    Reload(#[source] TantivyError),
}

/// Combined failure surface of a gate-coupled index rebuild.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Query-side failures. Only [`QueryError::Parse`] is recoverable.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid search query: {0}")]
    Parse(#[from] QueryParserError),

    #[error("search execution failed: {0}")]
    Execute(#[source] TantivyError),

    #[error("failed to load matching document: {0}")]
    Retrieve(#[source] TantivyError),
}
