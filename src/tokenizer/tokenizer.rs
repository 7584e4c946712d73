use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use super::Stem;
use crate::config::TokenizerConfig;

/// Text analyzer with stemming and stopword removal
///
/// The same analyzer must be used to build a search index and to query it,
/// otherwise stemmed query terms will not line up with the stored postings.
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// Build an analyzer for English documentation text
    pub fn new(config: &TokenizerConfig) -> Self {
        let stemmer = config.stem.then(|| Stemmer::create(Algorithm::English));
        let stopwords = match config.remove_stopwords {
            true => get(LANGUAGE::English)
                .into_iter()
                .map(|word| word.to_lowercase())
                .collect(),
            false => HashSet::new(),
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Analyzed terms of `text`, in reading order
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter_map(|word| self.analyze_word(word))
            .collect()
    }

    /// Tokenize text into unique terms, preserving first-occurrence order
    pub fn unique_terms(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenize(text)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect()
    }

    /// Compute term frequencies for a text
    pub fn compute_term_frequencies(&self, text: &str) -> HashMap<String, u32> {
        let mut freq = HashMap::new();
        for token in self.tokenize(text) {
            *freq.entry(token).or_insert(0) += 1;
        }
        freq
    }

    fn analyze_word(&self, word: &str) -> Option<String> {
        let token = if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };

        let len = token.chars().count();
        if len < self.config.min_token_length
            || len > self.config.max_token_length
            || self.stopwords.contains(&token)
        {
            return None;
        }

        match &self.stemmer {
            Some(stemmer) => Some(stemmer.stem(&token).into_owned()),
            None => Some(token),
        }
    }
}

impl Stem for Tokenizer {
    fn stem_word(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(&lower).to_lowercase(),
            None => lower,
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}
