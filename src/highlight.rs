//! Query-term highlighting over plain text
//!
//! Highlighting splits text into non-hit and hit segments whose concatenation
//! reproduces the input exactly; touching matches give adjacent hit segments.
//! Words are compared in their stemmed, lowercased form, so a query for
//! "widget" marks "Widgets".

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::HighlightSegment;
use crate::tokenizer::Stem;

static NON_WORD: Lazy<Regex> = Lazy::new(|| compile_regex(r"\W+"));

pub(crate) fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

const ELLIPSIS: &str = "...";

/// Words of `text`, split on runs of non-word characters
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    NON_WORD.split(text).filter(|w| !w.is_empty())
}

/// Stemmed, lowercased query words
pub fn stemmed_query_words<S: Stem + ?Sized>(query: &str, stemmer: &S) -> HashSet<String> {
    split_words(query).map(|w| stemmer.stem_word(w)).collect()
}

/// Split `text` into hit and non-hit segments for `query`
pub fn highlight_segments<S: Stem + ?Sized>(
    text: &str,
    query: &str,
    stemmer: &S,
) -> Vec<HighlightSegment> {
    let query_words = stemmed_query_words(query, stemmer);
    if query_words.is_empty() || text.is_empty() {
        return vec![HighlightSegment::plain(text)];
    }

    let mut seen = HashSet::new();
    let mut matched: Vec<&str> = split_words(text)
        .filter(|w| query_words.contains(&stemmer.stem_word(w)))
        .filter(|w| seen.insert(w.to_lowercase()))
        .collect();
    if matched.is_empty() {
        return vec![HighlightSegment::plain(text)];
    }

    // Longest first so alternation prefers "widgets" over "widget"
    matched.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

    let alternation = matched
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = match Regex::new(&format!("(?i){}", alternation)) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to compile highlight pattern");
            return vec![HighlightSegment::plain(text)];
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last {
            segments.push(HighlightSegment::plain(&text[last..m.start()]));
        }
        segments.push(HighlightSegment::hit(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(HighlightSegment::plain(&text[last..]));
    }
    segments
}

/// Truncate `text` to `max_length` characters on a word boundary, then highlight
///
/// The cut happens at the last space at or before `max_length`; text with no
/// such space is cut hard at `max_length`. Truncated text ends with `...`.
pub fn format_fragment_segments<S: Stem + ?Sized>(
    text: &str,
    query: &str,
    stemmer: &S,
    max_length: usize,
) -> Vec<HighlightSegment> {
    highlight_segments(&truncate_fragment(text, max_length), query, stemmer)
}

fn truncate_fragment(text: &str, max_length: usize) -> String {
    let Some((limit, _)) = text.char_indices().nth(max_length) else {
        return text.to_string();
    };

    let cut = text
        .char_indices()
        .take(max_length + 1)
        .filter(|(_, c)| *c == ' ')
        .map(|(i, _)| i)
        .last()
        .unwrap_or(limit);

    let mut truncated = text[..cut].to_string();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Render segments as HTML, wrapping hits in `<mark>`
pub fn render_segments_html(segments: &[HighlightSegment]) -> String {
    let mut html = String::new();
    for segment in segments {
        if segment.is_hit {
            html.push_str("<mark>");
            html.push_str(&escape_html(&segment.text));
            html.push_str("</mark>");
        } else {
            html.push_str(&escape_html(&segment.text));
        }
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Concatenated text of a segment list
pub fn segments_text(segments: &[HighlightSegment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}
