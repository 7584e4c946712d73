use serde::{Deserialize, Serialize};

use super::corpus::DocRef;

/// Search result with relevance score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "ref")]
    pub doc_ref: DocRef,
    pub score: f32,
}

impl SearchResult {
    pub fn new(doc_ref: DocRef, score: f32) -> Self {
        Self { doc_ref, score }
    }
}

/// Piece of highlighted text; a segment list concatenates back to its source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSegment {
    pub text: String,
    pub is_hit: bool,
}

impl HighlightSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_hit: false,
        }
    }

    pub fn hit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_hit: true,
        }
    }
}

/// Highlighted fragments of one document
pub type Fragments = Vec<Vec<HighlightSegment>>;

/// Search result joined with the corpus metadata needed to render it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub result: SearchResult,
    pub path: Option<String>,
    pub names: Vec<String>,
    pub route: Option<String>,
}

impl SearchHit {
    /// Title shown for the hit: last breadcrumb, falling back to the path
    pub fn title(&self) -> String {
        self.names
            .last()
            .cloned()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| format!("#{}", self.result.doc_ref))
    }
}
