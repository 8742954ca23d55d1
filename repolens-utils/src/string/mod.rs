//! Character-exact string truncation
//!
//! Lengths are counted in Unicode scalar values, never bytes, and cuts are
//! made at a fixed count with no attempt to respect word or line boundaries.

/// Borrow at most the first `max_chars` characters of `text`
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncate `text` to `max_chars` characters, appending `marker` only when
/// something was cut off
pub fn truncate_with_marker(text: &str, max_chars: usize, marker: &str) -> String {
    let prefix = char_prefix(text, max_chars);
    if prefix.len() == text.len() {
        text.to_string()
    } else {
        let mut truncated = String::with_capacity(prefix.len() + marker.len());
        truncated.push_str(prefix);
        truncated.push_str(marker);
        truncated
    }
}
