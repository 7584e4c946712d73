//! Serialized full-text index (`search-index.json`)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::field::FieldIndex;
use super::query::StructuredQuery;
use super::scoring::Bm25Params;
use super::{RawHit, TextIndex};
use crate::error::{DocsError, Result};
use crate::models::DocRef;
use crate::tokenizer::Tokenizer;

/// Current index format version
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Stored fields of a document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Static snapshot of the documentation index
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextIndexSnapshot {
    pub version: u32,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldIndex>,
    #[serde(default)]
    pub document_store: BTreeMap<String, StoredDocument>,
}

impl Default for TextIndexSnapshot {
    fn default() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            fields: BTreeMap::new(),
            document_store: BTreeMap::new(),
        }
    }
}

impl TextIndexSnapshot {
    /// Parse a snapshot and prepare its statistics
    pub fn from_json(url: &str, bytes: &[u8]) -> Result<Self> {
        let mut snapshot: Self = serde_json::from_slice(bytes).map_err(|source| DocsError::Parse {
            url: url.to_string(),
            source,
        })?;
        if !snapshot.is_compatible() {
            return Err(DocsError::UnsupportedIndexVersion {
                expected: INDEX_FORMAT_VERSION,
                actual: snapshot.version,
            });
        }
        snapshot.finalize();
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| DocsError::Internal(format!("failed to serialize index: {}", e)))
    }

    pub fn is_compatible(&self) -> bool {
        self.version <= INDEX_FORMAT_VERSION
    }

    pub fn finalize(&mut self) {
        for field in self.fields.values_mut() {
            field.finalize();
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    pub fn stored(&self, raw_ref: &str) -> Option<&StoredDocument> {
        self.document_store.get(raw_ref)
    }

    /// Number of documents with stored fields
    pub fn len(&self) -> usize {
        self.document_store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_store.is_empty()
    }
}

/// Snapshot paired with the analyzer it was built with
pub struct SearchIndex {
    snapshot: TextIndexSnapshot,
    tokenizer: Arc<Tokenizer>,
    params: Bm25Params,
}

impl SearchIndex {
    pub fn new(snapshot: TextIndexSnapshot, tokenizer: Arc<Tokenizer>) -> Self {
        Self {
            snapshot,
            tokenizer,
            params: Bm25Params::default(),
        }
    }

    pub fn with_params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    pub fn snapshot(&self) -> &TextIndexSnapshot {
        &self.snapshot
    }

    pub fn tokenizer(&self) -> &Arc<Tokenizer> {
        &self.tokenizer
    }
}

impl TextIndex for SearchIndex {
    fn search(&self, query: &str, structured: &StructuredQuery) -> Vec<RawHit> {
        let terms = self.tokenizer.unique_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut combined: HashMap<String, f32> = HashMap::new();
        for clause in &structured.clauses {
            let Some(field) = self.snapshot.field(&clause.field) else {
                continue;
            };
            for (raw_ref, score) in field.score_terms(&terms, clause.operator, &self.params) {
                *combined.entry(raw_ref).or_insert(0.0) += score * clause.boost;
            }
        }

        let mut hits: Vec<RawHit> = combined
            .into_iter()
            .map(|(raw_ref, score)| RawHit { raw_ref, score })
            .collect();
        hits.sort_by(compare_hits);
        hits
    }

    fn document_body(&self, doc_ref: DocRef) -> Option<String> {
        self.snapshot
            .stored(&doc_ref.to_string())
            .map(|doc| doc.body.clone())
    }

    fn document_refs(&self) -> Vec<String> {
        self.snapshot.document_store.keys().cloned().collect()
    }
}

/// Descending score, then ascending numeric ref
fn compare_hits(a: &RawHit, b: &RawHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| numeric_key(&a.raw_ref).cmp(&numeric_key(&b.raw_ref)))
        .then_with(|| a.raw_ref.cmp(&b.raw_ref))
}

fn numeric_key(raw_ref: &str) -> u64 {
    raw_ref.trim().parse().unwrap_or(u64::MAX)
}
