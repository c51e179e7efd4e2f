//! Keyword extraction from event body text

use regex::Regex;
use std::sync::OnceLock;

/// A keyword match within a body text: the tag with its marker stripped,
/// plus the byte offset of the `#` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub keyword: String,
    pub position: usize,
}

/// A keyword is a `#`-prefixed run of word characters containing at least
/// one letter, not preceded by a word character. `#abc` matches, `x#abc`
/// does not, `#123` has no letter and does not qualify.
fn keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\B#(\w*[a-zA-Z]\w*)").unwrap())
}

/// Extract every tagged keyword from `text`, in order of appearance.
pub fn extract_keywords(text: &str) -> Vec<KeywordMatch> {
    keyword_regex()
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            KeywordMatch {
                keyword: caps[1].to_string(),
                position: whole.start(),
            }
        })
        .collect()
}
