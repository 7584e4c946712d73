//! Lazily loaded, memoized documentation resources
//!
//! Every resource lives in a [`CacheGeneration`]: one `OnceCell` per resource.
//! The first caller of a loader performs the fetch while concurrent callers
//! wait on the same cell. A failed load leaves the cell empty so the next call
//! fetches again. `reset_caches` swaps in an empty generation; callers already
//! holding the old one finish on it.

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

use super::fetch::{validate_response, ResourceFetcher};
use crate::config::{join_url, normalize_doc_path};
use crate::error::{DocsError, Result};
use crate::index::{SearchIndex, TextIndexSnapshot};
use crate::mapping::{ContextMappingResolver, ElementMapping, ElementMappingBuilder};
use crate::metrics::DocsMetrics;
use crate::models::{lift_untitled, MappingRule, NamesIndex, PathsIndex, TocNode};
use crate::tokenizer::Tokenizer;

/// Static documentation resources
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Paths,
    Names,
    Toc,
    SearchIndex,
    ContextMapping,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Paths,
        Resource::Names,
        Resource::Toc,
        Resource::SearchIndex,
        Resource::ContextMapping,
    ];

    /// File name under the assets base
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Paths => "paths.json",
            Resource::Names => "names.json",
            Resource::Toc => "toc.json",
            Resource::SearchIndex => "search-index.json",
            Resource::ContextMapping => "context-doc-mapping.json",
        }
    }

    /// Metric label
    pub fn label(self) -> &'static str {
        match self {
            Resource::Paths => "paths",
            Resource::Names => "names",
            Resource::Toc => "toc",
            Resource::SearchIndex => "search_index",
            Resource::ContextMapping => "context_mapping",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// `toc.json` holds either a single root node or a list of top-level nodes
#[derive(Deserialize)]
#[serde(untagged)]
enum TocDocument {
    Nodes(Vec<TocNode>),
    Root(TocNode),
}

/// One set of memoized resources bound to an assets base
pub struct CacheGeneration {
    assets_base: String,
    paths: OnceCell<Arc<PathsIndex>>,
    names: OnceCell<Arc<NamesIndex>>,
    toc: OnceCell<Arc<Vec<TocNode>>>,
    search_index: OnceCell<Arc<SearchIndex>>,
    context_mapping: OnceCell<Arc<ContextMappingResolver>>,
    element_mapping: OnceCell<Arc<ElementMapping>>,
}

impl CacheGeneration {
    fn new(assets_base: String) -> Self {
        Self {
            assets_base,
            paths: OnceCell::new(),
            names: OnceCell::new(),
            toc: OnceCell::new(),
            search_index: OnceCell::new(),
            context_mapping: OnceCell::new(),
            element_mapping: OnceCell::new(),
        }
    }

    pub fn assets_base(&self) -> &str {
        &self.assets_base
    }

    pub fn resource_url(&self, resource: Resource) -> String {
        join_url(&self.assets_base, resource.file_name())
    }

    /// Whether a resource has been loaded in this generation
    pub fn is_loaded(&self, resource: Resource) -> bool {
        match resource {
            Resource::Paths => self.paths.initialized(),
            Resource::Names => self.names.initialized(),
            Resource::Toc => self.toc.initialized(),
            Resource::SearchIndex => self.search_index.initialized(),
            Resource::ContextMapping => self.context_mapping.initialized(),
        }
    }
}

/// Memoizing loader for the documentation corpus
pub struct ResourceCache {
    fetcher: Arc<dyn ResourceFetcher>,
    tokenizer: Arc<Tokenizer>,
    element_builder: ElementMappingBuilder,
    generation: ArcSwap<CacheGeneration>,
    metrics: Option<Arc<DocsMetrics>>,
}

impl ResourceCache {
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        assets_base: impl Into<String>,
        tokenizer: Arc<Tokenizer>,
        element_builder: ElementMappingBuilder,
    ) -> Self {
        Self {
            fetcher,
            tokenizer,
            element_builder,
            generation: ArcSwap::from_pointee(CacheGeneration::new(assets_base.into())),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<DocsMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Current generation
    pub fn generation(&self) -> Arc<CacheGeneration> {
        self.generation.load_full()
    }

    pub fn assets_base(&self) -> String {
        self.generation.load().assets_base.clone()
    }

    pub fn tokenizer(&self) -> &Arc<Tokenizer> {
        &self.tokenizer
    }

    /// Drop every memoized resource
    pub fn reset_caches(&self) {
        let assets_base = self.assets_base();
        self.swap_generation(assets_base);
    }

    /// Point the cache at a new assets base and drop every memoized resource
    pub fn set_assets_base(&self, assets_base: impl Into<String>) {
        self.swap_generation(assets_base.into());
    }

    fn swap_generation(&self, assets_base: String) {
        tracing::info!(assets_base = %assets_base, "Resetting documentation caches");
        self.generation
            .store(Arc::new(CacheGeneration::new(assets_base)));
        if let Some(metrics) = &self.metrics {
            metrics.record_reset();
        }
    }

    pub async fn load_paths(&self) -> Result<Arc<PathsIndex>> {
        self.load_paths_in(&self.generation()).await
    }

    pub async fn load_names(&self) -> Result<Arc<NamesIndex>> {
        let generation = self.generation();
        let value = generation
            .names
            .get_or_try_init(|| async {
                let names: NamesIndex = self.load_json(&generation, Resource::Names).await?;
                Ok::<_, DocsError>(Arc::new(names))
            })
            .await?;
        Ok(value.clone())
    }

    /// Table of contents with untitled grouping nodes lifted away
    pub async fn load_toc(&self) -> Result<Arc<Vec<TocNode>>> {
        let generation = self.generation();
        let value = generation
            .toc
            .get_or_try_init(|| async {
                let document: TocDocument = self.load_json(&generation, Resource::Toc).await?;
                let nodes = match document {
                    TocDocument::Root(root) => vec![root],
                    TocDocument::Nodes(nodes) => nodes,
                };
                Ok::<_, DocsError>(Arc::new(lift_untitled(nodes)))
            })
            .await?;
        Ok(value.clone())
    }

    pub async fn load_search_index(&self) -> Result<Arc<SearchIndex>> {
        let generation = self.generation();
        let value = generation
            .search_index
            .get_or_try_init(|| async {
                let resource = Resource::SearchIndex;
                let url = generation.resource_url(resource);
                let loaded = self
                    .tracked(resource, async {
                        let body = self.fetch_validated(&url).await?;
                        TextIndexSnapshot::from_json(&url, body.as_bytes())
                    })
                    .await?;
                tracing::debug!(documents = loaded.len(), "Loaded search index");
                Ok::<_, DocsError>(Arc::new(SearchIndex::new(loaded, self.tokenizer.clone())))
            })
            .await?;
        Ok(value.clone())
    }

    pub async fn load_context_mapping(&self) -> Result<Arc<ContextMappingResolver>> {
        let generation = self.generation();
        let value = generation
            .context_mapping
            .get_or_try_init(|| async {
                let rules: Vec<MappingRule> =
                    self.load_json(&generation, Resource::ContextMapping).await?;
                Ok::<_, DocsError>(Arc::new(ContextMappingResolver::new(rules)))
            })
            .await?;
        Ok(value.clone())
    }

    /// Element type mapping derived from the paths of the same generation
    pub async fn load_element_mapping(&self) -> Result<Arc<ElementMapping>> {
        let generation = self.generation();
        let value = generation
            .element_mapping
            .get_or_try_init(|| async {
                let paths = self.load_paths_in(&generation).await?;
                Ok::<_, DocsError>(Arc::new(self.element_builder.build(&paths)))
            })
            .await?;
        Ok(value.clone())
    }

    // Paths of a specific generation, so derived state never mixes generations
    async fn load_paths_in(&self, generation: &CacheGeneration) -> Result<Arc<PathsIndex>> {
        let value = generation
            .paths
            .get_or_try_init(|| async {
                let raw: Vec<String> = self.load_json(generation, Resource::Paths).await?;
                let paths: PathsIndex = raw
                    .iter()
                    .map(|path| normalize_doc_path(path).to_string())
                    .collect();
                if let Some(metrics) = &self.metrics {
                    metrics.set_corpus_documents(paths.len());
                }
                Ok::<_, DocsError>(Arc::new(paths))
            })
            .await?;
        Ok(value.clone())
    }

    async fn load_json<T: DeserializeOwned>(
        &self,
        generation: &CacheGeneration,
        resource: Resource,
    ) -> Result<T> {
        let url = generation.resource_url(resource);
        self.tracked(resource, async {
            let body = self.fetch_validated(&url).await?;
            serde_json::from_str(&body).map_err(|source| DocsError::Parse {
                url: url.clone(),
                source,
            })
        })
        .await
    }

    async fn fetch_validated(&self, url: &str) -> Result<String> {
        let response = self.fetcher.fetch(url).await?;
        validate_response(url, &response)?;
        Ok(response.body)
    }

    async fn tracked<T>(
        &self,
        resource: Resource,
        load: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = load.await;
        match &result {
            Ok(_) => {
                tracing::debug!(
                    resource = %resource,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Loaded resource"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_load(resource.label());
                }
            }
            Err(e) => {
                tracing::warn!(resource = %resource, error = %e, "Failed to load resource");
                if let Some(metrics) = &self.metrics {
                    metrics.record_load_failure(resource.label());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fetch::FetchResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapFetcher {
        responses: Mutex<HashMap<String, FetchResponse>>,
        calls: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(self, url: &str, response: FetchResponse) -> Self {
            self.responses.lock().insert(url.to_string(), response);
            self
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().iter().filter(|c| c.as_str() == url).count()
        }
    }

    #[async_trait]
    impl ResourceFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse> {
            self.calls.lock().push(url.to_string());
            tokio::task::yield_now().await;
            Ok(self
                .responses
                .lock()
                .get(url)
                .cloned()
                .unwrap_or_else(|| FetchResponse::json("").with_status(404)))
        }
    }

    fn cache(fetcher: Arc<MapFetcher>) -> ResourceCache {
        ResourceCache::new(
            fetcher,
            "/doc",
            Arc::new(Tokenizer::default()),
            ElementMappingBuilder::new("/doc", "library"),
        )
    }

    #[tokio::test]
    async fn test_paths_are_normalized_and_memoized() {
        let fetcher = Arc::new(
            MapFetcher::default()
                .with("/doc/paths.json", FetchResponse::json(r#"["/a/b.md","c/d"]"#)),
        );
        let cache = cache(fetcher.clone());

        let first = cache.load_paths().await.unwrap();
        let second = cache.load_paths().await.unwrap();
        assert_eq!(*first, vec!["a/b".to_string(), "c/d".to_string()]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls_to("/doc/paths.json"), 1);
    }

    #[tokio::test]
    async fn test_every_loader_fetches_once_per_generation() {
        let mut builder = crate::index::TextIndexBuilder::new(Arc::new(Tokenizer::default()));
        builder.add_document(0, "HTTP Trigger", "Starts a chain.");
        let index = builder.build().to_json().unwrap();
        let fetcher = Arc::new(
            MapFetcher::default()
                .with("/doc/paths.json", FetchResponse::json(r#"["library/http_trigger.md"]"#))
                .with("/doc/names.json", FetchResponse::json(r#"[["HTTP Trigger"]]"#))
                .with("/doc/toc.json", FetchResponse::json("[]"))
                .with("/doc/search-index.json", FetchResponse::json(&index))
                .with(
                    "/doc/context-doc-mapping.json",
                    FetchResponse::json(r#"[{"pattern":"^/chains","doc":"guide"}]"#),
                ),
        );
        let cache = cache(fetcher.clone());

        for _ in 0..2 {
            let (paths, names, toc, index, context, elements) = tokio::join!(
                cache.load_paths(),
                cache.load_names(),
                cache.load_toc(),
                cache.load_search_index(),
                cache.load_context_mapping(),
                cache.load_element_mapping(),
            );
            assert_eq!(paths.unwrap().len(), 1);
            assert_eq!(names.unwrap().len(), 1);
            assert!(toc.unwrap().is_empty());
            assert_eq!(index.unwrap().snapshot().len(), 1);
            assert_eq!(context.unwrap().len(), 1);
            assert_eq!(
                elements.unwrap().get("http-trigger").map(String::as_str),
                Some("/doc/library/http_trigger")
            );
        }

        for resource in Resource::ALL {
            let url = cache.generation().resource_url(resource);
            assert_eq!(fetcher.calls_to(&url), 1, "{}", url);
        }
    }

    #[tokio::test]
    async fn test_toc_accepts_root_object() {
        let toc = r#"{"children":[{"title":"Guide","documentId":0,"children":[]}]}"#;
        let fetcher = Arc::new(MapFetcher::default().with("/doc/toc.json", FetchResponse::json(toc)));
        let nodes = cache(fetcher).load_toc().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].title.as_deref(), Some("Guide"));
    }

    #[tokio::test]
    async fn test_failure_is_not_memoized() {
        let fetcher = Arc::new(MapFetcher::default());
        let cache = cache(fetcher.clone());
        assert!(cache.load_names().await.is_err());

        fetcher
            .responses
            .lock()
            .insert("/doc/names.json".to_string(), FetchResponse::json(r#"[["A"]]"#));
        let names = cache.load_names().await.unwrap();
        assert_eq!(*names, vec![vec!["A".to_string()]]);
        assert_eq!(fetcher.calls_to("/doc/names.json"), 2);
    }

    #[tokio::test]
    async fn test_set_assets_base_refetches_from_new_base() {
        let fetcher = Arc::new(
            MapFetcher::default()
                .with("/doc/paths.json", FetchResponse::json(r#"["old"]"#))
                .with("/v2/doc/paths.json", FetchResponse::json(r#"["new"]"#)),
        );
        let cache = cache(fetcher.clone());
        assert_eq!(*cache.load_paths().await.unwrap(), vec!["old".to_string()]);

        cache.set_assets_base("/v2/doc/");
        assert!(!cache.generation().is_loaded(Resource::Paths));
        assert_eq!(*cache.load_paths().await.unwrap(), vec!["new".to_string()]);
        assert_eq!(cache.assets_base(), "/v2/doc/");
    }

    #[tokio::test]
    async fn test_metrics_count_loads_and_failures() {
        let metrics = Arc::new(DocsMetrics::new().unwrap());
        let fetcher = Arc::new(
            MapFetcher::default().with("/doc/paths.json", FetchResponse::json("[]")),
        );
        let cache = cache(fetcher).with_metrics(metrics.clone());

        cache.load_paths().await.unwrap();
        assert!(cache.load_toc().await.is_err());
        cache.reset_caches();

        assert_eq!(
            metrics.resource_loads_total.with_label_values(&["paths"]).get(),
            1.0
        );
        assert_eq!(
            metrics
                .resource_load_failures_total
                .with_label_values(&["toc"])
                .get(),
            1.0
        );
        assert_eq!(metrics.cache_resets_total.get(), 1.0);
    }
}
