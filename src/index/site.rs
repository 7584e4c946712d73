//! Offline construction of `search-index.json` from a documentation site

use std::path::Path;
use std::sync::Arc;

use super::builder::TextIndexBuilder;
use super::snapshot::TextIndexSnapshot;
use crate::config::normalize_doc_path;
use crate::error::{DocsError, Result};
use crate::models::{DocRef, NamesIndex, PathsIndex};
use crate::tokenizer::Tokenizer;

/// Index every document listed in `<assets_dir>/paths.json`
///
/// The title of a document is the last entry of its breadcrumb in
/// `names.json`; its body is `<assets_dir>/<path>.md`. Documents whose
/// markdown is missing are left out of the index.
pub fn build_site_index(assets_dir: &Path, tokenizer: Arc<Tokenizer>) -> Result<TextIndexSnapshot> {
    let paths: PathsIndex = read_json(&assets_dir.join("paths.json"))?;
    let names: NamesIndex = read_json(&assets_dir.join("names.json"))?;
    if paths.len() != names.len() {
        return Err(DocsError::InconsistentCorpus(format!(
            "{} paths but {} name entries",
            paths.len(),
            names.len()
        )));
    }

    let mut builder = TextIndexBuilder::new(tokenizer);
    for (position, (path, breadcrumb)) in paths.iter().zip(&names).enumerate() {
        let path = normalize_doc_path(path);
        let file = assets_dir.join(format!("{}.md", path));
        let body = match std::fs::read_to_string(&file) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path, "Document source missing, not indexed");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let title = breadcrumb.last().map(String::as_str).unwrap_or(path);
        builder.add_document(position as DocRef, title, &body);
    }

    tracing::info!(documents = builder.len(), "Built documentation index");
    Ok(builder.build())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| DocsError::Parse {
        url: path.display().to_string(),
        source,
    })
}
