//! Best-matching paragraph fragments of a document
//!
//! The stored body is split into paragraphs and indexed on the fly; the same
//! documentation query that ranked the document then ranks its paragraphs.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::config::SnippetConfig;
use crate::highlight::{compile_regex, format_fragment_segments, split_words, stemmed_query_words};
use crate::index::{StructuredQuery, TextIndex, TextIndexBuilder, BODY_FIELD};
use crate::models::{DocRef, Fragments};
use crate::search::parse_ref;
use crate::tokenizer::Tokenizer;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| compile_regex(r"(?:\r?\n){2,}"));

/// Paragraph of a document body with its position in the unfiltered split
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph<'a> {
    pub position: usize,
    pub text: &'a str,
}

pub struct SnippetExtractor {
    tokenizer: Arc<Tokenizer>,
    config: SnippetConfig,
    query: StructuredQuery,
}

impl SnippetExtractor {
    pub fn new(tokenizer: Arc<Tokenizer>, config: SnippetConfig) -> Self {
        Self {
            tokenizer,
            config,
            query: StructuredQuery::documentation(),
        }
    }

    pub fn config(&self) -> &SnippetConfig {
        &self.config
    }

    /// Highlighted fragments of a document; empty if the index stores no body
    pub fn fragments_for(&self, index: &dyn TextIndex, doc_ref: DocRef, query: &str) -> Fragments {
        match index.document_body(doc_ref) {
            Some(body) => self.extract(&body, query),
            None => {
                tracing::debug!(doc_ref, "No stored body for document");
                Vec::new()
            }
        }
    }

    /// Highlighted fragments of the best paragraphs of `body`, in document order
    pub fn extract(&self, body: &str, query: &str) -> Fragments {
        let paragraphs = self.paragraphs(body);
        if paragraphs.is_empty() {
            return Vec::new();
        }

        let mut positions = self.ranked_positions(&paragraphs, query);
        if positions.is_empty() {
            positions = self.fallback_positions(&paragraphs, query);
        }
        positions.truncate(self.config.max_snippets);
        positions.sort_unstable();

        positions
            .into_iter()
            .filter_map(|position| paragraphs.iter().find(|p| p.position == position))
            .map(|paragraph| {
                format_fragment_segments(
                    paragraph.text,
                    query,
                    self.tokenizer.as_ref(),
                    self.config.fragment_max_length,
                )
            })
            .collect()
    }

    /// Trimmed paragraphs with at least `min_paragraph_words` words
    pub fn paragraphs<'a>(&self, body: &'a str) -> Vec<Paragraph<'a>> {
        PARAGRAPH_BREAK
            .split(body)
            .enumerate()
            .map(|(position, text)| Paragraph {
                position,
                text: text.trim(),
            })
            .filter(|p| split_words(p.text).count() >= self.config.min_paragraph_words)
            .collect()
    }

    fn ranked_positions(&self, paragraphs: &[Paragraph<'_>], query: &str) -> Vec<usize> {
        let mut builder = TextIndexBuilder::new(self.tokenizer.clone());
        for paragraph in paragraphs {
            builder.index_field(paragraph.position as DocRef, BODY_FIELD, paragraph.text);
        }
        let index = builder.build_searchable();

        index
            .search(query, &self.query)
            .into_iter()
            .filter_map(|hit| parse_ref(&hit.raw_ref))
            .map(|position| position as usize)
            .collect()
    }

    // Substring scan for queries the analyzer reduces to nothing useful
    fn fallback_positions(&self, paragraphs: &[Paragraph<'_>], query: &str) -> Vec<usize> {
        let words = stemmed_query_words(query, self.tokenizer.as_ref());
        if words.is_empty() {
            return Vec::new();
        }
        paragraphs
            .iter()
            .filter(|p| {
                let lower = p.text.to_lowercase();
                words.iter().any(|word| lower.contains(word.as_str()))
            })
            .map(|p| p.position)
            .collect()
    }
}
