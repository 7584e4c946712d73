//! Element type to documentation route inference
//!
//! Element documentation lives under a library folder, e.g.
//! `docs/3__Library/6__Triggers/1__HTTP_Trigger/http_trigger`. Both the file
//! name and its parent folder yield a slug (`http-trigger`) that resolves to
//! the document route.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::config::{join_url, normalize_doc_path, EngineConfig};
use crate::highlight::compile_regex;

/// slug -> document route
pub type ElementMapping = BTreeMap<String, String>;

/// Element types documented under another element's page
pub const ELEMENT_TYPE_ALIASES: &[(&str, &[&str])] = &[
    ("condition", &["if", "else"]),
    ("try-catch-finally", &["try", "catch", "finally"]),
];

static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| compile_regex(r"^\d+[_\-. ]+"));

/// Strip an ordering prefix such as `6__` or `01-`
pub fn strip_numeric_prefix(name: &str) -> &str {
    match NUMERIC_PREFIX.find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}

/// Lowercase a file or folder name and turn underscores into hyphens
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

/// Alias entries for every base slug present in `mapping`
pub fn element_type_aliases(mapping: &ElementMapping) -> ElementMapping {
    let mut aliases = ElementMapping::new();
    for (base, alias_slugs) in ELEMENT_TYPE_ALIASES {
        let Some(route) = mapping.get(*base) else {
            continue;
        };
        for alias in *alias_slugs {
            aliases.insert(alias.to_string(), route.clone());
        }
    }
    aliases
}

/// Derives element slugs from corpus paths
#[derive(Clone, Debug)]
pub struct ElementMappingBuilder {
    route_base: String,
    library_marker: String,
}

impl ElementMappingBuilder {
    pub fn new(route_base: impl Into<String>, library_marker: impl Into<String>) -> Self {
        Self {
            route_base: route_base.into(),
            library_marker: library_marker.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.route_base, &config.library_marker)
    }

    /// Build the slug table; the first path to claim a slug keeps it
    pub fn build(&self, paths: &[String]) -> ElementMapping {
        let mut mapping = ElementMapping::new();

        for path in paths {
            let path = normalize_doc_path(path);
            for slug in self.slugs_for(path) {
                mapping
                    .entry(slug)
                    .or_insert_with(|| join_url(&self.route_base, path));
            }
        }

        for (alias, route) in element_type_aliases(&mapping) {
            mapping.entry(alias).or_insert(route);
        }

        tracing::debug!(entries = mapping.len(), "Built element type mapping");
        mapping
    }

    /// Candidate slugs of one path, empty if it is not a library document
    pub fn slugs_for(&self, path: &str) -> Vec<String> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file, folders)) = segments.split_last() else {
            return Vec::new();
        };
        if !folders.iter().any(|folder| self.is_marker(folder)) {
            return Vec::new();
        }

        let mut slugs = Vec::with_capacity(2);
        let file_slug = slugify(file);
        if !file_slug.is_empty() {
            slugs.push(file_slug);
        }
        if let Some(parent) = folders.last().filter(|parent| !self.is_marker(parent)) {
            let folder_slug = slugify(strip_numeric_prefix(parent));
            if !folder_slug.is_empty() && !slugs.contains(&folder_slug) {
                slugs.push(folder_slug);
            }
        }
        slugs
    }

    fn is_marker(&self, folder: &str) -> bool {
        strip_numeric_prefix(folder).eq_ignore_ascii_case(&self.library_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ElementMappingBuilder {
        ElementMappingBuilder::new("/doc", "library")
    }

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_numeric_prefix() {
        assert_eq!(strip_numeric_prefix("6__Triggers"), "Triggers");
        assert_eq!(strip_numeric_prefix("01-Intro"), "Intro");
        assert_eq!(strip_numeric_prefix("2. Setup"), "Setup");
        assert_eq!(strip_numeric_prefix("Triggers"), "Triggers");
        assert_eq!(strip_numeric_prefix("404"), "404");
    }

    #[test]
    fn test_file_and_folder_slugs_agree() {
        let mapping = builder().build(&paths(&[
            "docs/3__Library/6__Triggers/1__HTTP_Trigger/http_trigger.md",
        ]));
        assert_eq!(
            mapping.get("http-trigger").map(String::as_str),
            Some("/doc/docs/3__Library/6__Triggers/1__HTTP_Trigger/http_trigger")
        );
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_folder_slug_differs_from_file_slug() {
        let mapping = builder().build(&paths(&["library/1__Script/overview.md"]));
        let route = "/doc/library/1__Script/overview";
        assert_eq!(mapping.get("overview").map(String::as_str), Some(route));
        assert_eq!(mapping.get("script").map(String::as_str), Some(route));
    }

    #[test]
    fn test_marker_folder_is_not_a_slug() {
        let mapping = builder().build(&paths(&["docs/Library/logging.md"]));
        assert!(mapping.contains_key("logging"));
        assert!(!mapping.contains_key("library"));
    }

    #[test]
    fn test_paths_outside_library_are_ignored() {
        let mapping = builder().build(&paths(&["docs/guides/http_trigger.md", "library.md"]));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_first_writer_wins() {
        let mapping = builder().build(&paths(&[
            "library/1__Triggers/http_trigger.md",
            "library/2__Legacy/http_trigger.md",
        ]));
        assert_eq!(
            mapping.get("http-trigger").map(String::as_str),
            Some("/doc/library/1__Triggers/http_trigger")
        );
    }

    #[test]
    fn test_aliases_require_base_slug() {
        let mapping = builder().build(&paths(&["library/condition.md"]));
        assert_eq!(mapping.get("if"), mapping.get("condition"));
        assert_eq!(mapping.get("else"), mapping.get("condition"));
        assert!(!mapping.contains_key("try"));
        assert!(!mapping.contains_key("catch"));
    }

    #[test]
    fn test_aliases_never_override_auto_entries() {
        let mapping = builder().build(&paths(&["library/condition.md", "library/if.md"]));
        assert_eq!(mapping.get("if").map(String::as_str), Some("/doc/library/if"));
        assert_eq!(
            mapping.get("else").map(String::as_str),
            Some("/doc/library/condition")
        );
    }

    #[test]
    fn test_element_type_aliases_standalone() {
        let mut mapping = ElementMapping::new();
        mapping.insert("try-catch-finally".to_string(), "/doc/x".to_string());
        let aliases = element_type_aliases(&mapping);
        assert_eq!(aliases.len(), 3);
        assert!(aliases.values().all(|route| route == "/doc/x"));
    }
}
