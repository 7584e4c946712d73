//! Documentation engine facade
//!
//! [`DocsEngine`] is what UI collaborators talk to: search with snippets,
//! table-of-contents access, element and context lookups that open the
//! matching document through an injected [`UrlOpener`].

use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{join_url, normalize_doc_path, EngineConfig};
use crate::error::{DocsError, Result};
use crate::highlight::render_segments_html;
use crate::index::TextIndex;
use crate::mapping::{ElementMapping, ElementMappingBuilder};
use crate::metrics::DocsMetrics;
use crate::models::{
    CorpusSummary, DocRef, Fragments, NamesIndex, PathsIndex, SearchHit, SearchResult, TocNode,
};
use crate::resources::{ResourceCache, ResourceFetcher};
use crate::search::{parse_ref, SearchEngine};
use crate::snippet::SnippetExtractor;
use crate::tokenizer::Tokenizer;

/// Side effect that shows a documentation URL to the user
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opener that only remembers what it was asked to open
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.opened.lock().last().cloned()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}

/// Callback notified when an open operation falls back to the home route
pub type ErrorCallback<'a> = &'a (dyn Fn(&DocsError) + Send + Sync);

pub struct DocsEngine {
    config: EngineConfig,
    cache: ResourceCache,
    search: SearchEngine,
    snippets: SnippetExtractor,
    opener: Arc<dyn UrlOpener>,
    metrics: Option<Arc<DocsMetrics>>,
}

impl DocsEngine {
    pub fn new(
        config: EngineConfig,
        fetcher: Arc<dyn ResourceFetcher>,
        opener: Arc<dyn UrlOpener>,
    ) -> Self {
        let tokenizer = Arc::new(Tokenizer::new(&config.tokenizer_config));
        let cache = ResourceCache::new(
            fetcher,
            config.assets_base.clone(),
            tokenizer.clone(),
            ElementMappingBuilder::from_config(&config),
        );
        let snippets = SnippetExtractor::new(tokenizer, config.snippet_config.clone());

        Self {
            config,
            cache,
            search: SearchEngine::new(),
            snippets,
            opener,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<DocsMetrics>) -> Self {
        self.cache = self.cache.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    /// Configuration the engine was created with
    ///
    /// The assets base may have changed since; see [`DocsEngine::assets_base`].
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn metrics(&self) -> Option<&Arc<DocsMetrics>> {
        self.metrics.as_ref()
    }

    pub fn assets_base(&self) -> String {
        self.cache.assets_base()
    }

    // ---- Search ----

    /// Ranked documents matching `query`
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let start = Instant::now();
        let index = self.cache.load_search_index().await?;
        let results = self.search.search(index.as_ref(), query);

        tracing::debug!(query, results = results.len(), "Search completed");
        self.record_search("documents", start);
        Ok(results)
    }

    /// Search results joined with their paths, breadcrumbs and routes
    pub async fn search_hits(&self, query: &str) -> Result<Vec<SearchHit>> {
        let results = self.search(query).await?;
        if results.is_empty() {
            return Ok(Vec::new());
        }
        let paths = self.cache.load_paths().await?;
        let names = self.cache.load_names().await?;

        Ok(results
            .into_iter()
            .map(|result| {
                let position = result.doc_ref as usize;
                let path = paths.get(position).cloned();
                SearchHit {
                    route: path.as_deref().map(|p| self.config.document_route(p)),
                    names: names.get(position).cloned().unwrap_or_default(),
                    path,
                    result,
                }
            })
            .collect())
    }

    /// Up to three highlighted fragments of a document for `query`
    pub async fn get_search_detail_segments(&self, doc_ref: DocRef, query: &str) -> Result<Fragments> {
        let start = Instant::now();
        let index = self.cache.load_search_index().await?;
        let fragments = self.snippets.fragments_for(index.as_ref(), doc_ref, query);
        self.record_search("snippets", start);
        Ok(fragments)
    }

    /// Fragments rendered as HTML with hits wrapped in `<mark>`
    pub async fn get_search_detail(&self, doc_ref: DocRef, query: &str) -> Result<Vec<String>> {
        let fragments = self.get_search_detail_segments(doc_ref, query).await?;
        Ok(fragments
            .iter()
            .map(|segments| render_segments_html(segments))
            .collect())
    }

    /// Fragments for many documents; candidates that fail are left out
    pub async fn get_search_details(
        &self,
        doc_refs: &[DocRef],
        query: &str,
    ) -> BTreeMap<DocRef, Fragments> {
        let outcomes = join_all(doc_refs.iter().map(|&doc_ref| async move {
            (doc_ref, self.get_search_detail_segments(doc_ref, query).await)
        }))
        .await;

        let mut details = BTreeMap::new();
        for (doc_ref, outcome) in outcomes {
            match outcome {
                Ok(fragments) => {
                    details.insert(doc_ref, fragments);
                }
                Err(e) => {
                    tracing::warn!(doc_ref, error = %e, "Omitting search candidate");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_snippet_failure();
                    }
                }
            }
        }
        details
    }

    // ---- Corpus ----

    pub async fn load_paths(&self) -> Result<Arc<PathsIndex>> {
        self.cache.load_paths().await
    }

    pub async fn load_names(&self) -> Result<Arc<NamesIndex>> {
        self.cache.load_names().await
    }

    pub async fn load_toc(&self) -> Result<Arc<Vec<TocNode>>> {
        self.cache.load_toc().await
    }

    /// Verify that paths, names and the search index describe the same documents
    pub async fn check_corpus_consistency(&self) -> Result<CorpusSummary> {
        let paths = self.cache.load_paths().await?;
        let names = self.cache.load_names().await?;
        let index = self.cache.load_search_index().await?;

        if paths.len() != names.len() {
            return Err(DocsError::InconsistentCorpus(format!(
                "{} paths but {} name entries",
                paths.len(),
                names.len()
            )));
        }

        let refs = index.document_refs();
        for raw_ref in &refs {
            match parse_ref(raw_ref) {
                Some(doc_ref) if (doc_ref as usize) < paths.len() => {}
                Some(doc_ref) => {
                    return Err(DocsError::InconsistentCorpus(format!(
                        "index document {} is out of range for {} paths",
                        doc_ref,
                        paths.len()
                    )));
                }
                None => {
                    return Err(DocsError::InconsistentCorpus(format!(
                        "index document ref {:?} is not numeric",
                        raw_ref
                    )));
                }
            }
        }

        Ok(CorpusSummary {
            documents: paths.len(),
            indexed_documents: refs.len(),
        })
    }

    // ---- Mapping ----

    pub async fn element_type_mapping(&self) -> Result<Arc<ElementMapping>> {
        self.cache.load_element_mapping().await
    }

    /// Route documenting an element type, or the not-found route
    pub async fn map_path_by_element_type(&self, slug: &str) -> Result<String> {
        let mapping = self.cache.load_element_mapping().await?;
        Ok(mapping
            .get(slug)
            .cloned()
            .unwrap_or_else(|| self.config.not_found_route()))
    }

    /// Route documenting a UI path, or the not-found route
    pub async fn map_context_to_route(&self, current_path: &str) -> Result<String> {
        let resolver = self.cache.load_context_mapping().await?;
        Ok(match resolver.map_context_to_doc(current_path) {
            Some(doc) => self.config.document_route(doc),
            None => self.config.not_found_route(),
        })
    }

    /// Open the documentation of an element type; returns the URL opened
    pub async fn open_chain_element_documentation(
        &self,
        slug: &str,
        on_error: Option<ErrorCallback<'_>>,
    ) -> String {
        let resolved = self.map_path_by_element_type(slug).await;
        self.open_resolved(resolved, on_error)
    }

    /// Open the documentation of the current UI path; returns the URL opened
    pub async fn open_context_documentation(
        &self,
        current_path: &str,
        on_error: Option<ErrorCallback<'_>>,
    ) -> String {
        let resolved = self.map_context_to_route(current_path).await;
        self.open_resolved(resolved, on_error)
    }

    fn open_resolved(&self, resolved: Result<String>, on_error: Option<ErrorCallback<'_>>) -> String {
        let home = self.config.home_route();
        let report = |e: &DocsError| {
            tracing::warn!(error = %e, "Opening documentation home instead");
            if let Some(callback) = on_error {
                callback(e);
            }
        };

        let route = match resolved {
            Ok(route) => route,
            Err(e) => {
                report(&e);
                home.clone()
            }
        };

        match self.opener.open(&route) {
            Ok(()) => route,
            Err(e) => {
                report(&e);
                if route != home {
                    if let Err(e) = self.opener.open(&home) {
                        tracing::warn!(error = %e, "Failed to open documentation home");
                    }
                }
                home
            }
        }
    }

    // ---- Cache control ----

    pub fn reset_caches(&self) {
        self.cache.reset_caches();
    }

    /// Switch to a new documentation assets base; every resource is refetched
    pub fn set_assets_base(&self, assets_base: impl Into<String>) {
        self.cache.set_assets_base(assets_base);
    }

    // ---- Routes ----

    pub fn document_route(&self, path: &str) -> String {
        self.config.document_route(path)
    }

    /// URL of a document's markdown source under the current assets base
    pub fn document_asset_url(&self, path: &str) -> String {
        join_url(
            &self.cache.assets_base(),
            &format!("{}.md", normalize_doc_path(path)),
        )
    }

    fn record_search(&self, kind: &str, start: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_search(kind, start.elapsed().as_secs_f64());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::FetchResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticFetcher(HashMap<String, String>);

    #[async_trait]
    impl ResourceFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse> {
            Ok(match self.0.get(url) {
                Some(body) => FetchResponse::json(body.clone()),
                None => FetchResponse::json("").with_status(404),
            })
        }
    }

    struct FailingOpener;

    impl UrlOpener for FailingOpener {
        fn open(&self, url: &str) -> Result<()> {
            Err(DocsError::Open {
                url: url.to_string(),
                message: "no browser".to_string(),
            })
        }
    }

    fn engine(files: &[(&str, &str)], opener: Arc<dyn UrlOpener>) -> DocsEngine {
        let files = files
            .iter()
            .map(|(name, body)| (format!("/doc/{}", name), body.to_string()))
            .collect();
        DocsEngine::new(
            EngineConfig::default(),
            Arc::new(StaticFetcher(files)),
            opener,
        )
    }

    #[tokio::test]
    async fn test_context_documentation_opens_mapped_route() {
        let opener = Arc::new(RecordingOpener::new());
        let engine = engine(
            &[(
                "context-doc-mapping.json",
                r#"[{"pattern":"^/chains","doc":"/chains/overview.md"}]"#,
            )],
            opener.clone(),
        );

        let opened = engine.open_context_documentation("/chains/7", None).await;
        assert_eq!(opened, "/doc/chains/overview");
        let opened = engine.open_context_documentation("/sessions", None).await;
        assert_eq!(opened, "/doc/not-found");
        assert_eq!(opener.opened(), vec!["/doc/chains/overview", "/doc/not-found"]);
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_home() {
        let opener = Arc::new(RecordingOpener::new());
        let engine = engine(&[], opener.clone());
        let errors = Mutex::new(Vec::new());
        let on_error = |e: &DocsError| errors.lock().push(e.to_string());

        let opened = engine
            .open_chain_element_documentation("http-trigger", Some(&on_error))
            .await;
        assert_eq!(opened, "/doc");
        assert_eq!(opener.last().as_deref(), Some("/doc"));
        assert_eq!(errors.lock().len(), 1);
        assert!(errors.lock()[0].contains("/doc/paths.json"));
    }

    #[tokio::test]
    async fn test_opener_failure_reports_and_returns_home() {
        let engine = engine(&[("paths.json", r#"["library/script.md"]"#)], Arc::new(FailingOpener));
        let errors = Mutex::new(0usize);
        let on_error = |_: &DocsError| *errors.lock() += 1;

        let opened = engine
            .open_chain_element_documentation("script", Some(&on_error))
            .await;
        assert_eq!(opened, "/doc");
        assert_eq!(*errors.lock(), 1);
    }

    #[tokio::test]
    async fn test_element_lookup() {
        let engine = engine(
            &[("paths.json", r#"["library/1__Flow/condition.md"]"#)],
            Arc::new(RecordingOpener::new()),
        );
        assert_eq!(
            engine.map_path_by_element_type("else").await.unwrap(),
            "/doc/library/1__Flow/condition"
        );
        assert_eq!(
            engine.map_path_by_element_type("unknown").await.unwrap(),
            "/doc/not-found"
        );
    }

    #[tokio::test]
    async fn test_document_asset_url_follows_assets_base() {
        let engine = engine(&[], Arc::new(RecordingOpener::new()));
        assert_eq!(engine.document_asset_url("/a/b.md"), "/doc/a/b.md");
        engine.set_assets_base("https://docs.example.com/v2");
        assert_eq!(
            engine.document_asset_url("a/b"),
            "https://docs.example.com/v2/a/b.md"
        );
        assert_eq!(engine.document_route("a/b"), "/doc/a/b");
    }
}
