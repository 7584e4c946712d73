//! Full-text index over the documentation corpus
//!
//! The site ships a prebuilt [`TextIndexSnapshot`]; [`SearchIndex`] runs
//! [`StructuredQuery`]s against it with per-field BM25 scoring.

mod builder;
mod field;
mod query;
mod scoring;
mod site;
mod snapshot;

pub use builder::TextIndexBuilder;
pub use field::FieldIndex;
pub use query::{FieldClause, MatchOperator, StructuredQuery, BODY_FIELD, TITLE_FIELD};
pub use scoring::{bm25_score, Bm25Params};
pub use site::build_site_index;
pub use snapshot::{SearchIndex, StoredDocument, TextIndexSnapshot, INDEX_FORMAT_VERSION};

use crate::models::DocRef;

/// A scored match before its ref is resolved against the corpus
#[derive(Clone, Debug, PartialEq)]
pub struct RawHit {
    pub raw_ref: String,
    pub score: f32,
}

/// Query interface over a full-text index
///
/// Hits come back ordered by descending score with ties broken on the
/// ascending numeric ref.
pub trait TextIndex: Send + Sync {
    fn search(&self, query: &str, structured: &StructuredQuery) -> Vec<RawHit>;

    /// Stored body of a document, if the index keeps one
    fn document_body(&self, doc_ref: DocRef) -> Option<String>;

    /// Refs of every stored document
    fn document_refs(&self) -> Vec<String>;
}
