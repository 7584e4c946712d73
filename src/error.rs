use thiserror::Error;

/// Main error type for documentation engine operations
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Resource {url} is not JSON (content type: {content_type})")]
    NotJson { url: String, content_type: String },

    #[error("Resource {url} returned an HTML page instead of JSON")]
    HtmlFallback { url: String },

    #[error("Failed to parse {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported search index version {actual}, expected <= {expected}")]
    UnsupportedIndexVersion { expected: u32, actual: u32 },

    #[error("Inconsistent documentation corpus: {0}")]
    InconsistentCorpus(String),

    #[error("Failed to open {url}: {message}")]
    Open { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for documentation engine operations
pub type Result<T> = std::result::Result<T, DocsError>;

impl DocsError {
    /// Check if this error indicates a transient failure that could be retried
    pub fn is_retriable(&self) -> bool {
        match self {
            DocsError::Fetch { .. } => true,
            DocsError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// URL of the resource the error refers to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            DocsError::Fetch { url, .. }
            | DocsError::HttpStatus { url, .. }
            | DocsError::NotJson { url, .. }
            | DocsError::HtmlFallback { url }
            | DocsError::Parse { url, .. }
            | DocsError::Open { url, .. } => Some(url),
            _ => None,
        }
    }
}
