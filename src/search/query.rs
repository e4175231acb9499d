//! Ranked query execution against the host index

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tantivy::TantivyDocument;
use tantivy::collector::TopDocs;
use tantivy::schema::Value;

use super::errors::QueryError;
use super::schema::HostSchema;
use super::store::HostIndex;

/// Maximum number of results returned by a search.
pub const RESULT_LIMIT: usize = 15;

/// Over-fetch factor so post-collection tie-breaking sees the full tie group.
const FETCH_MULTIPLIER: usize = 3;

/// One ranked search hit.
#[derive(Debug, Clone)]
pub struct ScoredHost {
    pub address: String,
    pub name: String,
    pub indexed_at: DateTime<Utc>,
    pub score: f32,
}

impl HostIndex {
    /// Execute a free-text query over the `name` and `tags` fields.
    ///
    /// Terms match in either field (boolean-OR default); explicit field
    /// prefixes such as `name:web` are honored. Results are ordered by score
    /// descending with an ascending-name tie-break, capped at
    /// [`RESULT_LIMIT`]. A term that is empty after trimming returns zero
    /// results without touching the parser.
    pub fn search(&self, term: &str) -> Result<Vec<ScoredHost>, QueryError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.query_parser.parse_query(term)?;
        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(RESULT_LIMIT * FETCH_MULTIPLIER))
            .map_err(QueryError::Execute)?;

        let mut hosts = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address).map_err(QueryError::Retrieve)?;
            hosts.push(scored_host(&doc, &self.schema, score));
        }

        hosts.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hosts.truncate(RESULT_LIMIT);

        tracing::info!(query = %term, results = hosts.len(), "search completed");
        Ok(hosts)
    }
}

fn scored_host(doc: &TantivyDocument, schema: &HostSchema, score: f32) -> ScoredHost {
    let address = doc
        .get_first(schema.address)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let name = doc
        .get_first(schema.name)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let indexed_at = doc
        .get_first(schema.indexed_at)
        .and_then(|v| v.as_datetime())
        .and_then(|dt| DateTime::from_timestamp(dt.into_timestamp_secs(), 0))
        .unwrap_or(DateTime::UNIX_EPOCH);

    ScoredHost {
        address,
        name,
        indexed_at,
        score,
    }
}
