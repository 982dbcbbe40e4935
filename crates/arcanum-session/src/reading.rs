//! Helpers for the accumulated interpretation text.

/// Appended in-band when a generation fails after producing some text.
pub const FAILURE_NOTICE: &str =
    "\n\n*The spirits are clouded... (the reading could not be completed).*";

/// Longest summary kept in reading history, in characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Condense a markdown reading into a one-paragraph summary for history.
///
/// Takes the first paragraph that is not a heading, strips emphasis markers,
/// collapses whitespace, and truncates to `max_chars` characters with an
/// ellipsis.
pub fn summarize_reading(text: &str, max_chars: usize) -> String {
    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with('#'))
        .unwrap_or("");

    let cleaned: String = paragraph
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
