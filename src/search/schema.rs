//! Tantivy schema for indexed host documents

use tantivy::schema::{
    DateOptions, Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions,
};

/// Whole-string tokenizer; keeps an address a single exact term so
/// delete-by-term replacement works.
const ADDRESS_TOKENIZER: &str = "raw";

/// Standard word analysis, no stopword removal.
const TEXT_TOKENIZER: &str = "default";

/// Schema with field handles for the four-field host document.
///
/// `address` is the unique key; `name` and `tags` are the scorable query
/// fields; `indexed_at` records write time independent of any timestamp on
/// the source record.
#[derive(Debug, Clone)]
pub struct HostSchema {
    pub schema: Schema,
    pub address: Field,
    pub name: Field,
    pub tags: Field,
    pub indexed_at: Field,
}

impl HostSchema {
    /// Build the schema with its production field options.
    #[must_use]
    pub fn build() -> Self {
        let mut builder = Schema::builder();

        let address = builder.add_text_field(
            "address",
            TextOptions::default().set_stored().set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(ADDRESS_TOKENIZER)
                    .set_index_option(IndexRecordOption::Basic),
            ),
        );

        let name = builder.add_text_field(
            "name",
            TextOptions::default().set_stored().set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(TEXT_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            ),
        );

        let tags = builder.add_text_field(
            "tags",
            TextOptions::default().set_stored().set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(TEXT_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            ),
        );

        let indexed_at = builder.add_date_field(
            "indexed_at",
            DateOptions::default().set_stored().set_indexed().set_fast(),
        );

        Self {
            schema: builder.build(),
            address,
            name,
            tags,
            indexed_at,
        }
    }
}
