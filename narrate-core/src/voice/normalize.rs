//! Hint normalisation: lowercase and fold away diacritics so unaccented
//! spellings (`nu` for `nữ`) match the same tokens.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lowercase `raw`, decompose it (NFD) and drop combining marks.
///
/// `đ` has no decomposition and is folded to `d` explicitly.
pub fn normalize_hint(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == 'đ' { 'd' } else { c })
        .collect()
}

/// Split a normalised hint into tokens on whitespace and commas.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}
