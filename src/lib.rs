pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod index;
pub mod mapping;
pub mod metrics;
pub mod models;
pub mod resources;
pub mod search;
pub mod session;
pub mod snippet;
pub mod sync;
pub mod tokenizer;

pub use config::{EngineConfig, SnippetConfig, TokenizerConfig};
pub use engine::{DocsEngine, ErrorCallback, RecordingOpener, UrlOpener};
pub use error::{DocsError, Result};
pub use highlight::{format_fragment_segments, highlight_segments, render_segments_html};
pub use index::{SearchIndex, StructuredQuery, TextIndex, TextIndexBuilder, TextIndexSnapshot};
pub use mapping::{element_type_aliases, ContextMappingResolver, ElementMapping, ElementMappingBuilder};
pub use metrics::DocsMetrics;
pub use models::{
    CorpusSummary, DocRef, Fragments, HighlightSegment, MappingRule, NamesIndex, PathsIndex,
    SearchHit, SearchResult, TocNode,
};
pub use resources::{DirFetcher, FetchResponse, Resource, ResourceCache, ResourceFetcher};
#[cfg(feature = "http")]
pub use resources::HttpFetcher;
pub use search::SearchEngine;
pub use session::{SearchOutcome, SearchSession};
pub use snippet::SnippetExtractor;
pub use sync::{Debouncer, LatestOnlyGuard};
pub use tokenizer::{Stem, Tokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
