//! [`FuzzPattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// `ILIKE` pattern matching any text containing the given input.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Creates a new [`FuzzPattern`] out of the given `input`, escaping the
    /// `LIKE` wildcards in it.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(format!(
            "%{}%",
            input
                .replace('\\', r"\\")
                .replace('%', r"\%")
                .replace('_', r"\_"),
        ))
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(FuzzPattern::new("villa").to_string(), "%villa%");
        assert_eq!(
            FuzzPattern::new(r"100%_off\").to_string(),
            r"%100\%\_off\\%",
        );
    }
}
