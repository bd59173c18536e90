//! Gender-phrase grammar.
//!
//! Tokens of the normalised hint are read left to right with a running repeat
//! count that starts at 1:
//!
//! - a positive integer sets the count and emits nothing;
//! - a male word (`nam`, `man`, `men`, `male`, `boy` prefixes) emits `count`
//!   male tags and resets the count to 1;
//! - a female word (`nu`, `woman`, `women`, `female`, `girl` prefixes) does the
//!   same for female;
//! - anything else is ignored.
//!
//! `"2 nam"` → `[male, male]`, `"1 nam 1 nu"` → `[male, female]`.

use super::normalize::{normalize_hint, tokens};
use super::Gender;

const MALE_PREFIXES: &[&str] = &["nam", "man", "men", "male", "boy"];
const FEMALE_PREFIXES: &[&str] = &["nu", "woman", "women", "female", "girl"];

/// Upper bound on the tags one gender word emits. Anything past 2 is already
/// a count mismatch, so the cap only limits allocation; [`GenderHint::requested`]
/// still reports the full count.
pub const MAX_REPEAT: usize = 16;

/// A parsed gender hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenderHint {
    /// Tags in hint order, at most [`MAX_REPEAT`] per gender word.
    pub tags: Vec<Gender>,
    /// Number of speakers the hint describes, uncapped (saturating).
    pub requested: usize,
}

impl GenderHint {
    pub fn parse(hint: &str) -> Self {
        let normalized = normalize_hint(hint);
        let mut parsed = Self::default();
        let mut repeat = 1usize;

        for token in tokens(&normalized) {
            if let Ok(n) = token.parse::<usize>() {
                if n > 0 {
                    repeat = n;
                }
                continue;
            }
            if let Some(gender) = classify_token(token) {
                parsed
                    .tags
                    .extend(std::iter::repeat(gender).take(repeat.min(MAX_REPEAT)));
                parsed.requested = parsed.requested.saturating_add(repeat);
                repeat = 1;
            }
        }
        parsed
    }
}

/// Classify one normalised token as a gender word.
pub fn classify_token(token: &str) -> Option<Gender> {
    if FEMALE_PREFIXES.iter().any(|p| token.starts_with(p)) {
        Some(Gender::Female)
    } else if MALE_PREFIXES.iter().any(|p| token.starts_with(p)) {
        Some(Gender::Male)
    } else {
        None
    }
}

/// Parse a free-text hint into an ordered list of gender tags.
pub fn parse_gender_hint(hint: &str) -> Vec<Gender> {
    GenderHint::parse(hint).tags
}

/// Whether a single-speaker hint asks for a male voice.
pub fn hint_is_male(hint: &str) -> bool {
    let normalized = normalize_hint(hint);
    let is_male = tokens(&normalized).any(|t| classify_token(t) == Some(Gender::Male));
    is_male
}
