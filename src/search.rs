//! Ranked full-text search over the documentation index

use crate::index::{StructuredQuery, TextIndex};
use crate::models::{DocRef, SearchResult};

/// Runs the documentation query against a [`TextIndex`]
#[derive(Clone, Debug)]
pub struct SearchEngine {
    query: StructuredQuery,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            query: StructuredQuery::documentation(),
        }
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom field-weighted query instead of the documentation default
    pub fn with_query(query: StructuredQuery) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &StructuredQuery {
        &self.query
    }

    /// Search `index`, dropping hits whose ref is not a document position
    pub fn search(&self, index: &dyn TextIndex, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        index
            .search(query, &self.query)
            .into_iter()
            .filter_map(|hit| match parse_ref(&hit.raw_ref) {
                Some(doc_ref) => Some(SearchResult::new(doc_ref, hit.score)),
                None => {
                    tracing::debug!(raw_ref = %hit.raw_ref, "Dropping hit with non-numeric ref");
                    None
                }
            })
            .collect()
    }
}

/// Parse a stringified index ref
pub fn parse_ref(raw: &str) -> Option<DocRef> {
    raw.trim().parse().ok()
}
