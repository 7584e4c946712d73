use regex::Regex;

use crate::models::MappingRule;

/// Resolves a UI path to the document describing it
///
/// Rules are tried in order and the first matching pattern wins. Patterns
/// that fail to compile are dropped when the resolver is built. Patterns use
/// `regex` syntax, which has no lookaround or backreferences; rules relying
/// on either are dropped the same way.
#[derive(Debug, Default)]
pub struct ContextMappingResolver {
    rules: Vec<(Regex, String)>,
}

impl ContextMappingResolver {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            match Regex::new(&rule.pattern) {
                Ok(regex) => compiled.push((regex, rule.doc)),
                Err(e) => {
                    tracing::warn!(pattern = %rule.pattern, error = %e, "Skipping invalid context mapping rule");
                }
            }
        }
        Self { rules: compiled }
    }

    /// Document of the first rule matching `path`
    pub fn map_context_to_doc(&self, path: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(path))
            .map(|(_, doc)| doc.as_str())
    }

    /// Number of usable rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
