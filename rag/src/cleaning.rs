//! Text normalization executed before chunking.

/// Collapses every run of whitespace to a single space and trims both ends.
///
/// Whitespace is Unicode `White_Space`, so tabs, newlines, carriage returns and
/// non-breaking spaces all fold into one ASCII space.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
