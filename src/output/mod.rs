// Output formatting: terminal display and CSV export.

pub mod csv;
pub mod terminal;

/// Shorten `text` to `max_chars` characters, marking the cut with "...".
/// Counts characters, not bytes, so paper titles with accents are safe.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
