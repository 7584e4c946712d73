//! Fetch-like resource loaders
//!
//! Documentation assets are plain static files. A misconfigured server will
//! often answer a missing file with its HTML index page and a 200 status, so
//! every response is validated before it is parsed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{DocsError, Result};

/// Raw response of a resource fetch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchResponse {
    /// A 200 response with a JSON content type
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_string);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of documentation resources
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url`; transport failures are errors, HTTP statuses are not
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// Check that a response carries a JSON document
pub fn validate_response(url: &str, response: &FetchResponse) -> Result<()> {
    if !response.is_success() {
        return Err(DocsError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    let content_type = response.content_type.as_deref().unwrap_or("");
    if !content_type.to_ascii_lowercase().contains("json") {
        return Err(DocsError::NotJson {
            url: url.to_string(),
            content_type: content_type.to_string(),
        });
    }

    if response.body.trim_start().starts_with('<') {
        return Err(DocsError::HtmlFallback {
            url: url.to_string(),
        });
    }

    Ok(())
}

/// Fetches resources over HTTP(S)
#[cfg(feature = "http")]
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: Option<reqwest::Url>,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Fetcher for absolute URLs only
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: None,
        }
    }

    /// Fetcher resolving relative URLs such as `/doc/paths.json` against `origin`
    pub fn with_origin(origin: &str) -> Result<Self> {
        let origin = reqwest::Url::parse(origin).map_err(|e| DocsError::Fetch {
            url: origin.to_string(),
            message: format!("invalid origin: {}", e),
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            origin: Some(origin),
        })
    }

    fn resolve(&self, url: &str) -> Result<reqwest::Url> {
        let resolved = match &self.origin {
            Some(origin) => origin.join(url),
            None => reqwest::Url::parse(url),
        };
        resolved.map_err(|e| DocsError::Fetch {
            url: url.to_string(),
            message: format!("invalid URL: {}", e),
        })
    }
}

#[cfg(feature = "http")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let resolved = self.resolve(url)?;
        tracing::debug!(url = %resolved, "Fetching resource");

        let response = self
            .client
            .get(resolved)
            .send()
            .await
            .map_err(|e| DocsError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| DocsError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Serves resources from a local site directory
///
/// `/doc/paths.json` maps to `<root>/doc/paths.json`. Missing files answer 404.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> Result<PathBuf> {
        let relative = url.split(['?', '#']).next().unwrap_or(url);
        let relative = relative.trim_start_matches('/');
        if relative.split('/').any(|part| part == "..") {
            return Err(DocsError::Fetch {
                url: url.to_string(),
                message: "path escapes the site directory".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for DirFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let path = self.resolve(url)?;
        tracing::debug!(path = %path.display(), "Reading resource");

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse {
                status: 200,
                content_type: content_type_for(&path).map(str::to_string),
                body,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                content_type: Some("text/plain".to_string()),
                body: String::new(),
            }),
            Err(e) => Err(DocsError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some("application/json"),
        "md" => Some("text/markdown; charset=utf-8"),
        "html" | "htm" => Some("text/html; charset=utf-8"),
        "txt" => Some("text/plain; charset=utf-8"),
        _ => None,
    }
}
