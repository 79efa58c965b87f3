// src/util/text.rs

/// First non-empty line of a note, trimmed.
///
/// # Examples
///
/// ```
/// use pnote::util::text::first_line;
///
/// assert_eq!(first_line("\n  buy milk \nand eggs"), "buy milk");
/// ```
pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// One-line preview for list output.
pub fn summary(text: &str, max_chars: usize) -> String {
    truncate(first_line(text), max_chars)
}
