use std::collections::BTreeMap;
use std::sync::Arc;

use super::field::FieldIndex;
use super::query::{BODY_FIELD, TITLE_FIELD};
use super::snapshot::{SearchIndex, StoredDocument, TextIndexSnapshot, INDEX_FORMAT_VERSION};
use crate::models::DocRef;
use crate::tokenizer::Tokenizer;

/// Accumulates documents into a [`TextIndexSnapshot`]
pub struct TextIndexBuilder {
    tokenizer: Arc<Tokenizer>,
    fields: BTreeMap<String, FieldIndex>,
    documents: BTreeMap<String, StoredDocument>,
}

impl TextIndexBuilder {
    pub fn new(tokenizer: Arc<Tokenizer>) -> Self {
        Self {
            tokenizer,
            fields: BTreeMap::new(),
            documents: BTreeMap::new(),
        }
    }

    /// Index a document's title and body and keep both as stored fields
    pub fn add_document(&mut self, doc_ref: DocRef, title: &str, body: &str) -> &mut Self {
        self.index_field(doc_ref, TITLE_FIELD, title);
        self.index_field(doc_ref, BODY_FIELD, body);
        self.documents.insert(
            doc_ref.to_string(),
            StoredDocument {
                title: title.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    /// Index text under a single field without storing it
    pub fn index_field(&mut self, doc_ref: DocRef, field: &str, text: &str) -> &mut Self {
        let frequencies = self.tokenizer.compute_term_frequencies(text);
        let doc_len: u32 = frequencies.values().sum();
        self.fields
            .entry(field.to_string())
            .or_default()
            .add_document(&doc_ref.to_string(), frequencies, doc_len);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn build(self) -> TextIndexSnapshot {
        let mut snapshot = TextIndexSnapshot {
            version: INDEX_FORMAT_VERSION,
            fields: self.fields,
            document_store: self.documents,
        };
        snapshot.finalize();
        snapshot
    }

    /// Build the snapshot and pair it with this builder's analyzer
    pub fn build_searchable(self) -> SearchIndex {
        let tokenizer = self.tokenizer.clone();
        SearchIndex::new(self.build(), tokenizer)
    }
}
