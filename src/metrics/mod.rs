use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for the documentation engine
#[derive(Clone)]
pub struct DocsMetrics {
    // Counters
    pub resource_loads_total: CounterVec,
    pub resource_load_failures_total: CounterVec,
    pub searches_total: CounterVec,
    pub cache_resets_total: Counter,
    pub stale_results_total: Counter,
    pub snippet_failures_total: Counter,

    // Gauges
    pub corpus_documents: Gauge,

    // Histograms
    pub search_latency: HistogramVec,

    // Registry
    registry: Arc<Registry>,
}

impl DocsMetrics {
    /// Create a new DocsMetrics instance with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Counters
        let resource_loads_total = CounterVec::new(
            Opts::new(
                "chaindocs_resource_loads_total",
                "Total number of documentation resources fetched and parsed",
            ),
            &["resource"],
        )?;
        registry.register(Box::new(resource_loads_total.clone()))?;

        let resource_load_failures_total = CounterVec::new(
            Opts::new(
                "chaindocs_resource_load_failures_total",
                "Total number of failed documentation resource loads",
            ),
            &["resource"],
        )?;
        registry.register(Box::new(resource_load_failures_total.clone()))?;

        let searches_total = CounterVec::new(
            Opts::new("chaindocs_searches_total", "Total number of searches by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(searches_total.clone()))?;

        let cache_resets_total = Counter::with_opts(Opts::new(
            "chaindocs_cache_resets_total",
            "Total number of resource cache resets",
        ))?;
        registry.register(Box::new(cache_resets_total.clone()))?;

        let stale_results_total = Counter::with_opts(Opts::new(
            "chaindocs_stale_results_total",
            "Total number of search results discarded as superseded",
        ))?;
        registry.register(Box::new(stale_results_total.clone()))?;

        let snippet_failures_total = Counter::with_opts(Opts::new(
            "chaindocs_snippet_failures_total",
            "Total number of search candidates omitted from batched snippet extraction",
        ))?;
        registry.register(Box::new(snippet_failures_total.clone()))?;

        // Gauges
        let corpus_documents = Gauge::with_opts(Opts::new(
            "chaindocs_corpus_documents",
            "Number of documents in the loaded paths index",
        ))?;
        registry.register(Box::new(corpus_documents.clone()))?;

        // Histograms
        let search_latency = HistogramVec::new(
            HistogramOpts::new("chaindocs_search_latency_seconds", "Search operation latency")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["kind"],
        )?;
        registry.register(Box::new(search_latency.clone()))?;

        Ok(Self {
            resource_loads_total,
            resource_load_failures_total,
            searches_total,
            cache_resets_total,
            stale_results_total,
            snippet_failures_total,
            corpus_documents,
            search_latency,
            registry: Arc::new(registry),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a successful resource load
    pub fn record_load(&self, resource: &str) {
        self.resource_loads_total.with_label_values(&[resource]).inc();
    }

    /// Record a failed resource load
    pub fn record_load_failure(&self, resource: &str) {
        self.resource_load_failures_total
            .with_label_values(&[resource])
            .inc();
    }

    /// Record a search operation
    pub fn record_search(&self, kind: &str, duration_secs: f64) {
        self.searches_total.with_label_values(&[kind]).inc();
        self.search_latency
            .with_label_values(&[kind])
            .observe(duration_secs);
    }

    pub fn record_reset(&self) {
        self.cache_resets_total.inc();
    }

    pub fn record_stale_result(&self) {
        self.stale_results_total.inc();
    }

    pub fn record_snippet_failure(&self) {
        self.snippet_failures_total.inc();
    }

    /// Update corpus size gauge
    pub fn set_corpus_documents(&self, count: usize) {
        self.corpus_documents.set(count as f64);
    }

    /// Render every registered metric in the text exposition format
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
