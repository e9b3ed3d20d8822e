// Text cleanup applied to extracted PDF text before vectorization.
//
// Two mutually exclusive policies exist: `preprocess` (letters only,
// stop words removed, nouns lemmatized) and `truncate_bibliography`
// (digits removed, everything from the first back-matter heading dropped).
// The pipeline picks one per run; they are never composed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};

static NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s]").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static regex"));
static BACK_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(acknowledgments|works cited|notes|references)\b").expect("static regex")
});

// NLTK's English list (the `nltk` feature of `stop-words`). The default ISO
// list also drops content words such as "research", "results" and "system".
static ENGLISH_STOPWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    get(LANGUAGE::English)
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect()
});

/// A back-matter heading found after this fraction of the text is treated
/// as a false positive (a "references" mention near the end of the body).
const CUTOFF_FRACTION: f64 = 0.9;

/// Irregular plural nouns the suffix rules would get wrong.
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("children", "child"),
    ("criteria", "criterion"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("hypotheses", "hypothesis"),
    ("men", "man"),
    ("mice", "mouse"),
    ("phenomena", "phenomenon"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("women", "woman"),
];

/// The fixed English stop-word list shared by the cleaner and the vectorizer.
pub fn english_stopwords() -> &'static HashSet<String> {
    &ENGLISH_STOPWORDS
}

/// Normalize raw text into a token-ready string.
///
/// Non-letters become spaces, whitespace runs collapse to one space, and the
/// result is lowercased. With `lowercase_lemmatize` set, stop words are
/// dropped and the remaining tokens reduced to their lemma.
pub fn preprocess(text: &str, lowercase_lemmatize: bool) -> String {
    let letters_only = NON_LETTERS.replace_all(text, " ");
    let collapsed = WHITESPACE.replace_all(&letters_only, " ");
    let lowered = collapsed.trim().to_lowercase();

    if !lowercase_lemmatize {
        return lowered;
    }

    let stop_words = english_stopwords();
    lowered
        .split_whitespace()
        .filter(|token| !stop_words.contains(*token))
        .map(lemmatize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop the bibliography and other back matter from a paper's text.
///
/// Digits are removed, whitespace collapsed and the text lowercased. The text
/// is then cut at the earliest whole-word "acknowledgments", "works cited",
/// "notes" or "references". A heading in the last 10% of the text is ignored.
/// Applying this twice gives the same result as applying it once.
pub fn truncate_bibliography(text: &str) -> String {
    let without_digits = DIGITS.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&without_digits, " ");
    let lowered = collapsed.to_lowercase();

    match find_cutoff_position(&lowered) {
        Some(byte_pos) => {
            let total_chars = lowered.chars().count();
            let cutoff_chars = lowered[..byte_pos].chars().count();
            if (cutoff_chars as f64) < total_chars as f64 * CUTOFF_FRACTION {
                lowered[..byte_pos].to_string()
            } else {
                lowered
            }
        }
        None => lowered,
    }
}

/// Byte offset of the earliest back-matter heading, if any.
pub fn find_cutoff_position(text: &str) -> Option<usize> {
    BACK_MATTER.find(text).map(|m| m.start())
}

/// Reduce a lowercase token to its noun lemma.
///
/// Mirrors WordNet's noun detachment rules without the dictionary check:
/// an irregular-form table first, then suffix rules guarded by minimum
/// lengths so short words ("gas", "bus", "this") are left alone.
pub fn lemmatize(token: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR_NOUNS.iter().find(|(plural, _)| *plural == token) {
        return (*lemma).to_string();
    }

    let len = token.len();
    if len > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..len - 3]);
    }
    if token.ends_with("sses") {
        return token[..len - 2].to_string();
    }
    if len > 4
        && (token.ends_with("ches")
            || token.ends_with("shes")
            || token.ends_with("xes")
            || token.ends_with("zes"))
    {
        return token[..len - 2].to_string();
    }
    if len > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..len - 1].to_string();
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_strips_non_letters() {
        let cleaned = preprocess("Hello, World! 42 times...\n\tagain", false);
        assert_eq!(cleaned, "hello world times again");
    }

    #[test]
    fn test_preprocess_lemmatizes_and_drops_stopwords() {
        let cleaned = preprocess("The proteins of membranes and the enzymes", true);
        assert_eq!(cleaned, "protein membrane enzyme");
    }

    #[test]
    fn test_preprocess_keeps_research_vocabulary() {
        let cleaned = preprocess("Research results show the system value", true);
        assert_eq!(cleaned, "research result show system value");
    }

    #[test]
    fn test_stopword_list_is_nltk_english() {
        let stop_words = english_stopwords();
        assert_eq!(stop_words.len(), 179);
        assert!(stop_words.contains("the"));
        assert!(stop_words.contains("ourselves"));
        for word in ["research", "results", "system", "information", "value", "problem"] {
            assert!(!stop_words.contains(word), "{word}");
        }
    }

    #[test]
    fn test_truncate_cuts_at_references() {
        let body = "word ".repeat(100);
        let text = format!("{body}References 1. Smith 2001 more text here");
        let truncated = truncate_bibliography(&text);
        assert!(!truncated.contains("references"));
        assert!(truncated.starts_with("word word"));
    }

    #[test]
    fn test_truncate_ignores_late_mention() {
        let body = "word ".repeat(100);
        let text = format!("{body}see notes");
        let truncated = truncate_bibliography(&text);
        assert!(truncated.ends_with("see notes"));
    }

    #[test]
    fn test_truncate_requires_whole_word() {
        let text = "footnotes and preferences are fine here";
        assert_eq!(find_cutoff_position(text), None);
    }

    #[test]
    fn test_lemmatize_rules() {
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("matches"), "match");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("proteins"), "protein");
        assert_eq!(lemmatize("status"), "status");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("gas"), "gas");
        assert_eq!(lemmatize("women"), "woman");
    }
}
