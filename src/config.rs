use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL the documentation assets are served from
pub const DEFAULT_ASSETS_BASE: &str = "/doc";
/// Default route prefix documents are rendered under
pub const DEFAULT_ROUTE_BASE: &str = "/doc";

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the static documentation assets (`paths.json`, `*.md`, ...)
    pub assets_base: String,
    /// Route prefix used for document links
    pub route_base: String,
    /// Folder name marking element library documents
    pub library_marker: String,
    /// Delay between the last keystroke and a new search cycle
    pub debounce_ms: u64,
    pub tokenizer_config: TokenizerConfig,
    pub snippet_config: SnippetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assets_base: DEFAULT_ASSETS_BASE.to_string(),
            route_base: DEFAULT_ROUTE_BASE.to_string(),
            library_marker: "library".to_string(),
            debounce_ms: 250,
            tokenizer_config: TokenizerConfig::default(),
            snippet_config: SnippetConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the assets base URL
    pub fn with_assets_base(mut self, base: impl Into<String>) -> Self {
        self.assets_base = base.into();
        self
    }

    /// Set the route base
    pub fn with_route_base(mut self, base: impl Into<String>) -> Self {
        self.route_base = base.into();
        self
    }

    /// Set the library marker folder name
    pub fn with_library_marker(mut self, marker: impl Into<String>) -> Self {
        self.library_marker = marker.into();
        self
    }

    /// Set the interactive search debounce delay
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// URL of a static resource file, e.g. `/doc/paths.json`
    pub fn resource_url(&self, file: &str) -> String {
        join_url(&self.assets_base, file)
    }

    /// Route of a document: `<routeBase>/<path>`
    pub fn document_route(&self, path: &str) -> String {
        join_url(&self.route_base, normalize_doc_path(path))
    }

    /// Asset URL of a document's markdown source: `<assetsBase>/<path>.md`
    pub fn document_asset_url(&self, path: &str) -> String {
        join_url(&self.assets_base, &format!("{}.md", normalize_doc_path(path)))
    }

    /// Route shown when a document cannot be resolved
    pub fn not_found_route(&self) -> String {
        join_url(&self.route_base, "not-found")
    }

    /// Documentation home route
    pub fn home_route(&self) -> String {
        let trimmed = self.route_base.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Strip a leading slash and a trailing `.md` extension from a corpus path
pub fn normalize_doc_path(path: &str) -> &str {
    let path = path.trim_start_matches('/');
    path.strip_suffix(".md").unwrap_or(path)
}

pub(crate) fn join_url(base: &str, file: &str) -> String {
    let base = base.trim_end_matches('/');
    let file = file.trim_start_matches('/');
    if base.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", base, file)
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            min_token_length: 1,
            max_token_length: 50,
        }
    }
}

/// Snippet extraction settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnippetConfig {
    /// Maximum number of fragments returned per document
    pub max_snippets: usize,
    /// Fragments longer than this (in characters) are truncated
    pub fragment_max_length: usize,
    /// Paragraphs with fewer words are not considered
    pub min_paragraph_words: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            max_snippets: 3,
            fragment_max_length: 300,
            min_paragraph_words: 2,
        }
    }
}
