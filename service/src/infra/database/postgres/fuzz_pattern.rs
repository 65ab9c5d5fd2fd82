//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// `SIMILAR TO` pattern matching any word of a search input.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Characters having a special meaning in a `SIMILAR TO` pattern.
    const SPECIAL: &'static [char] = &[
        '\\', '%', '_', '|', '*', '+', '?', '{', '}', '(', ')', '[', ']',
    ];

    /// Creates a new [`FuzzPattern`] out of the given `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(format!(
            "%({})%",
            input
                .split_whitespace()
                .map(Self::escape)
                .format("|"),
        ))
    }

    /// Escapes the special characters of the provided `word`.
    fn escape(word: &str) -> String {
        let mut escaped = String::with_capacity(word.len());
        for c in word.chars() {
            if Self::SPECIAL.contains(&c) {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn matches_any_word() {
        assert_eq!(
            FuzzPattern::new("  cebu   villa ").to_string(),
            "%(cebu|villa)%",
        );
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(
            FuzzPattern::new("50% off_(now)").to_string(),
            r"%(50\%|off\_\(now\))%",
        );
    }
}
