mod tokenizer;

pub use tokenizer::Tokenizer;

/// Reduces a word to its canonical root form
pub trait Stem {
    fn stem_word(&self, word: &str) -> String;
}

/// Stemmer that only lowercases, useful where stemming is disabled
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityStemmer;

impl Stem for IdentityStemmer {
    fn stem_word(&self, word: &str) -> String {
        word.to_lowercase()
    }
}
