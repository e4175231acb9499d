//! On-disk index store for host documents
//!
//! Opens or creates the tantivy index and performs gate-coupled, atomically
//! committed batch upserts keyed by host address.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tantivy::directory::MmapDirectory;
use tantivy::query::QueryParser;
use tantivy::{Index, IndexReader, IndexSettings, IndexWriter, Term, doc};

use super::errors::{IndexError, RefreshError};
use super::freshness::FreshnessGate;
use super::schema::HostSchema;
use crate::discovery::HostRecord;

const WRITER_MEMORY_BUDGET: usize = 50_000_000; // 50MB

/// Outcome of an upsert call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The gate reported the index as still fresh; nothing was written.
    Fresh,
    /// A rebuild ran and committed this many documents.
    Indexed { count: usize },
}

/// Handle over the persisted host index.
pub struct HostIndex {
    pub(crate) index: Index,
    pub(crate) schema: HostSchema,
    pub(crate) reader: IndexReader,
    pub(crate) query_parser: QueryParser,
    index_dir: PathBuf,
}

impl HostIndex {
    /// Open the index at `index_dir`, creating directory and index on first
    /// use. An existing index whose schema no longer matches is discarded and
    /// recreated; the index is a cache rebuilt from discovery, so that is
    /// always safe.
    pub fn open(index_dir: &Path) -> Result<Self, IndexError> {
        std::fs::create_dir_all(index_dir).map_err(|source| IndexError::CreateDir {
            path: index_dir.to_path_buf(),
            source,
        })?;

        let schema = HostSchema::build();

        let index = if index_dir.join("meta.json").exists() {
            let existing =
                Index::open_in_dir(index_dir).map_err(|source| IndexError::Open {
                    path: index_dir.to_path_buf(),
                    source,
                })?;

            if existing.schema().num_fields() == schema.schema.num_fields() {
                tracing::info!(path = %index_dir.display(), "using existing index");
                existing
            } else {
                tracing::warn!(
                    existing_fields = existing.schema().num_fields(),
                    expected_fields = schema.schema.num_fields(),
                    "schema mismatch detected, recreating index"
                );
                drop(existing);
                std::fs::remove_dir_all(index_dir).map_err(|source| IndexError::CreateDir {
                    path: index_dir.to_path_buf(),
                    source,
                })?;
                std::fs::create_dir_all(index_dir).map_err(|source| IndexError::CreateDir {
                    path: index_dir.to_path_buf(),
                    source,
                })?;
                Self::create_at(index_dir, &schema)?
            }
        } else {
            tracing::info!(path = %index_dir.display(), "creating index");
            Self::create_at(index_dir, &schema)?
        };

        let reader = index.reader().map_err(IndexError::Reader)?;
        let query_parser = QueryParser::for_index(&index, vec![schema.name, schema.tags]);

        Ok(Self {
            index,
            schema,
            reader,
            query_parser,
            index_dir: index_dir.to_path_buf(),
        })
    }

    fn create_at(index_dir: &Path, schema: &HostSchema) -> Result<Index, IndexError> {
        let directory = MmapDirectory::open(index_dir).map_err(|source| IndexError::Create {
            path: index_dir.to_path_buf(),
            source: source.into(),
        })?;
        Index::create(directory, schema.schema.clone(), IndexSettings::default()).map_err(
            |source| IndexError::Create {
                path: index_dir.to_path_buf(),
                source,
            },
        )
    }

    /// Rebuild the index from `records` if the gate reports the index stale.
    ///
    /// The gate is consulted exactly once per call; when the index is still
    /// fresh this returns immediately without touching the store. A rebuild
    /// replaces any document sharing an address (full overwrite, no merge),
    /// stamps every document with the current write time, and commits the
    /// whole batch as one transaction.
    pub fn upsert(
        &self,
        gate: &FreshnessGate,
        records: &[HostRecord],
    ) -> Result<UpsertOutcome, RefreshError> {
        if !gate.should_refresh()? {
            tracing::info!("index is still fresh, skipping rebuild");
            return Ok(UpsertOutcome::Fresh);
        }

        let mut writer: IndexWriter = self
            .index
            .writer(WRITER_MEMORY_BUDGET)
            .map_err(IndexError::Writer)?;

        let indexed_at = tantivy::DateTime::from_timestamp_secs(Utc::now().timestamp());
        let mut count = 0usize;
        for record in records {
            writer.delete_term(Term::from_field_text(self.schema.address, &record.address));
            writer
                .add_document(doc!(
                    self.schema.address => record.address.as_str(),
                    self.schema.name => record.name.as_str(),
                    self.schema.tags => record.tags.join(" "),
                    self.schema.indexed_at => indexed_at,
                ))
                .map_err(IndexError::Write)?;
            tracing::debug!(address = %record.address, "indexed host");
            count += 1;
        }

        writer.commit().map_err(IndexError::Commit)?;
        self.reader.reload().map_err(IndexError::Reload)?;

        tracing::info!(count, path = %self.index_dir.display(), "index rebuild committed");
        Ok(UpsertOutcome::Indexed { count })
    }

    /// Number of live documents in the index.
    #[must_use]
    pub fn doc_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}
