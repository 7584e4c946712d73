//! Per-field inverted index with BM25 statistics

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::query::MatchOperator;
use super::scoring::{bm25_score, Bm25Params};

/// Inverted index of a single field, keyed by stringified document ref
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIndex {
    /// term -> (ref -> term frequency)
    #[serde(default)]
    pub postings: BTreeMap<String, BTreeMap<String, u32>>,
    /// ref -> field length in tokens
    #[serde(default)]
    pub doc_lengths: BTreeMap<String, u32>,
    #[serde(skip)]
    avg_doc_length: Option<f32>,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one document's terms for this field
    pub fn add_document(&mut self, doc_ref: &str, term_frequencies: HashMap<String, u32>, doc_len: u32) {
        self.doc_lengths.insert(doc_ref.to_string(), doc_len);
        for (term, tf) in term_frequencies {
            self.postings
                .entry(term)
                .or_default()
                .insert(doc_ref.to_string(), tf);
        }
        self.avg_doc_length = None;
    }

    /// Cache the average field length; call after the last `add_document`
    pub fn finalize(&mut self) {
        self.avg_doc_length = Some(self.compute_avg_doc_length());
    }

    /// Number of documents with this field
    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Number of documents containing a term
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, BTreeMap::len)
    }

    pub fn avg_doc_length(&self) -> f32 {
        self.avg_doc_length
            .unwrap_or_else(|| self.compute_avg_doc_length())
    }

    fn compute_avg_doc_length(&self) -> f32 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        let total: u64 = self.doc_lengths.values().map(|&l| l as u64).sum();
        total as f32 / self.doc_lengths.len() as f32
    }

    /// Score documents against analyzed query terms
    ///
    /// With [`MatchOperator::And`] only documents containing every term are
    /// returned; with [`MatchOperator::Or`] any single term is enough.
    pub fn score_terms(
        &self,
        terms: &[String],
        operator: MatchOperator,
        params: &Bm25Params,
    ) -> HashMap<String, f32> {
        if terms.is_empty() {
            return HashMap::new();
        }

        let total_docs = self.doc_count() as f32;
        let avgdl = self.avg_doc_length();
        let mut scores: HashMap<String, (f32, usize)> = HashMap::new();

        for term in terms {
            let Some(postings) = self.postings.get(term) else {
                if operator == MatchOperator::And {
                    return HashMap::new();
                }
                continue;
            };
            let df = postings.len() as f32;
            for (doc_ref, &tf) in postings {
                let doc_len = self.doc_lengths.get(doc_ref).copied().unwrap_or(0) as f32;
                let score = bm25_score(tf as f32, df, total_docs, doc_len, avgdl, params);
                let entry = scores.entry(doc_ref.clone()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }

        scores
            .into_iter()
            .filter(|(_, (_, matched))| operator == MatchOperator::Or || *matched == terms.len())
            .map(|(doc_ref, (score, _))| (doc_ref, score))
            .collect()
    }
}
