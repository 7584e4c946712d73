//! Interactive search-as-you-type session
//!
//! Keystrokes go through a [`Debouncer`]; each search cycle takes a
//! [`LatestOnlyGuard`] token and re-checks it after every await, so only the
//! newest query ever reaches the sink.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::DocsEngine;
use crate::error::Result;
use crate::models::{DocRef, Fragments, SearchHit};
use crate::sync::{Debouncer, LatestOnlyGuard};

/// Results of one completed search cycle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub details: BTreeMap<DocRef, Fragments>,
}

type Sink = Arc<dyn Fn(Result<SearchOutcome>) + Send + Sync>;

struct SessionState {
    engine: Arc<DocsEngine>,
    guard: LatestOnlyGuard,
    sink: Sink,
}

impl SessionState {
    /// Run one cycle; returns whether its outcome was delivered
    async fn run_cycle(&self, query: String) -> bool {
        let token = self.guard.next_token();
        let trimmed = query.trim();
        if trimmed.is_empty() {
            (self.sink)(Ok(SearchOutcome {
                query,
                ..SearchOutcome::default()
            }));
            return true;
        }

        let hits = match self.engine.search_hits(trimmed).await {
            Ok(hits) => hits,
            Err(e) => {
                if !self.still_latest(token, &query) {
                    return false;
                }
                (self.sink)(Err(e));
                return true;
            }
        };
        if !self.still_latest(token, &query) {
            return false;
        }

        let refs: Vec<DocRef> = hits.iter().map(|hit| hit.result.doc_ref).collect();
        let details = self.engine.get_search_details(&refs, trimmed).await;
        if !self.still_latest(token, &query) {
            return false;
        }

        (self.sink)(Ok(SearchOutcome {
            query,
            hits,
            details,
        }));
        true
    }

    fn still_latest(&self, token: u64, query: &str) -> bool {
        if self.guard.is_latest(token) {
            return true;
        }
        tracing::debug!(token, query, "Discarding stale search results");
        if let Some(metrics) = self.engine.metrics() {
            metrics.record_stale_result();
        }
        false
    }
}

/// Debounced, race-free search driver for a search box
pub struct SearchSession {
    state: Arc<SessionState>,
    debouncer: Debouncer<String>,
}

impl SearchSession {
    /// Create a session delivering every fresh outcome to `sink`
    ///
    /// Must be created within a tokio runtime.
    pub fn new<F>(engine: Arc<DocsEngine>, sink: F) -> Self
    where
        F: Fn(Result<SearchOutcome>) + Send + Sync + 'static,
    {
        let delay = engine.config().debounce_delay();
        let state = Arc::new(SessionState {
            engine,
            guard: LatestOnlyGuard::new(),
            sink: Arc::new(sink),
        });

        let cycle_state = state.clone();
        let debouncer = Debouncer::new(delay, move |query: String| {
            let state = cycle_state.clone();
            tokio::spawn(async move {
                state.run_cycle(query).await;
            });
        });

        Self { state, debouncer }
    }

    /// Feed the current search box contents
    pub fn input(&self, query: impl Into<String>) {
        self.debouncer.call(query.into());
    }

    /// Run a cycle immediately, bypassing the debounce delay
    pub async fn search_now(&self, query: impl Into<String>) -> bool {
        self.debouncer.cancel();
        self.state.run_cycle(query.into()).await
    }

    /// Drop the pending input and invalidate any cycle in flight
    pub fn cancel(&self) {
        self.debouncer.cancel();
        self.state.guard.next_token();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
