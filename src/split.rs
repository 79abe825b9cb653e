//! # Delimiter Splitting

/// Split `text` on `delimiter`, keeping every segment.
///
/// For `k` occurrences of the delimiter exactly `k + 1` segments are returned,
/// including empty leading, trailing and interior segments. Text without the
/// delimiter yields a single segment equal to the input.
#[must_use]
pub fn split(text: &str, delimiter: char) -> Vec<&str> {
    text.split(delimiter).collect()
}
