#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chaindocs::{
    DocsEngine, EngineConfig, FetchResponse, RecordingOpener, ResourceFetcher, Result,
    TextIndexBuilder, Tokenizer,
};

/// In-memory fetcher with per-URL call counts and optional latency
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, FetchResponse>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, response: FetchResponse) {
        self.responses.lock().insert(url.to_string(), response);
    }

    pub fn set_json(&self, url: &str, body: &str) {
        self.set(url, FetchResponse::json(body));
    }

    pub fn remove(&self, url: &str) {
        self.responses.lock().remove(url);
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().insert(url.to_string(), delay);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ResourceFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        *self.calls.lock().entry(url.to_string()).or_insert(0) += 1;

        let delay = self.delays.lock().get(url).copied();
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        Ok(self
            .responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                FetchResponse::json("<html>not found</html>")
                    .with_status(404)
                    .with_content_type(Some("text/html"))
            }))
    }
}

pub struct FixtureDoc {
    pub path: &'static str,
    pub names: &'static [&'static str],
    pub body: &'static str,
}

pub const FIXTURE: &[FixtureDoc] = &[
    FixtureDoc {
        path: "guide/getting_started.md",
        names: &["Guide", "Getting Started"],
        body: "Chains connect triggers, senders and scripts.\n\n\
               Open the chain editor to add a widget.\n\n\
               Save often.",
    },
    FixtureDoc {
        path: "docs/3__Library/6__Triggers/1__HTTP_Trigger/http_trigger.md",
        names: &["Library", "Triggers", "HTTP Trigger"],
        body: "The HTTP trigger starts a chain on an incoming request.\n\n\
               Configure the path and the HTTP method.\n\n\
               Responses are produced by the last element of the chain.",
    },
    FixtureDoc {
        path: "docs/3__Library/2__Flow/condition.md",
        names: &["Library", "Flow", "Condition"],
        body: "A condition routes messages into branches.\n\n\
               Each branch holds an expression evaluated in order.",
    },
    FixtureDoc {
        path: "docs/3__Library/7__Senders/kafka_sender.md",
        names: &["Library", "Senders", "Kafka Sender"],
        body: "The Kafka sender publishes messages to a topic.\n\n\
               Widgets in the properties panel control batching.",
    },
];

pub fn paths_json() -> String {
    let paths: Vec<&str> = FIXTURE.iter().map(|d| d.path).collect();
    serde_json::to_string(&paths).unwrap()
}

pub fn names_json() -> String {
    let names: Vec<&[&str]> = FIXTURE.iter().map(|d| d.names).collect();
    serde_json::to_string(&names).unwrap()
}

pub fn search_index_json() -> String {
    let mut builder = TextIndexBuilder::new(Arc::new(Tokenizer::default()));
    for (position, doc) in FIXTURE.iter().enumerate() {
        let title = doc.names.last().copied().unwrap_or_default();
        builder.add_document(position as u32, title, doc.body);
    }
    builder.build().to_json().unwrap()
}

pub const TOC_JSON: &str = r#"{
    "children": [
        {"title": "Guide", "children": [
            {"title": "Getting Started", "documentId": 0, "children": []}
        ]},
        {"children": [
            {"title": "Library", "children": [
                {"title": "HTTP Trigger", "documentId": 1, "children": []}
            ]}
        ]}
    ]
}"#;

pub const CONTEXT_MAPPING_JSON: &str = r#"[
    {"pattern": "^/chains/[^/]+/graph", "doc": "/guide/getting_started.md"},
    {"pattern": "^/library/triggers", "doc": "docs/3__Library/6__Triggers/1__HTTP_Trigger/http_trigger.md"},
    {"pattern": "([", "doc": "broken.md"}
]"#;

/// Fetcher serving the full fixture corpus under `/doc`
pub fn fixture_fetcher() -> Arc<FakeFetcher> {
    let fetcher = FakeFetcher::new();
    fetcher.set_json("/doc/paths.json", &paths_json());
    fetcher.set_json("/doc/names.json", &names_json());
    fetcher.set_json("/doc/toc.json", TOC_JSON);
    fetcher.set_json("/doc/search-index.json", &search_index_json());
    fetcher.set_json("/doc/context-doc-mapping.json", CONTEXT_MAPPING_JSON);
    Arc::new(fetcher)
}

pub fn engine_with(fetcher: Arc<FakeFetcher>) -> (DocsEngine, Arc<RecordingOpener>) {
    let opener = Arc::new(RecordingOpener::new());
    let engine = DocsEngine::new(EngineConfig::default(), fetcher, opener.clone());
    (engine, opener)
}
