//! Scoring functions for search operations

use serde::{Deserialize, Serialize};

/// BM25 parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f32,
    /// Length normalization parameter
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Compute BM25 score for a term in a document
///
/// # Arguments
/// * `tf` - Term frequency in document
/// * `df` - Document frequency (how many documents contain the term)
/// * `total_docs` - Total number of documents in the field
/// * `doc_len` - Length of the document field (in tokens)
/// * `avg_doc_len` - Average field length across all documents
pub fn bm25_score(
    tf: f32,
    df: f32,
    total_docs: f32,
    doc_len: f32,
    avg_doc_len: f32,
    params: &Bm25Params,
) -> f32 {
    if total_docs <= 0.0 || tf <= 0.0 {
        return 0.0;
    }

    // Inverse document frequency, always positive
    let idf = ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln();

    let norm = if avg_doc_len > 0.0 {
        1.0 - params.b + params.b * (doc_len / avg_doc_len)
    } else {
        1.0
    };

    idf * (tf * (params.k1 + 1.0)) / (tf + params.k1 * norm)
}
