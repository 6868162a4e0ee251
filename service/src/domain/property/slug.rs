//! [`Slug`] definitions.

use std::sync::LazyLock;

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;

#[cfg(doc)]
use crate::domain::Property;

/// URL-safe unique identifier of a [`Property`] derived from its title.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Creates a new [`Slug`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `slug` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Creates a new [`Slug`] if the given `slug` is valid.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Option<Self> {
        let slug = slug.into();
        Self::check(&slug).then_some(Self(slug))
    }

    /// Derives a base [`Slug`] from the provided `title`:
    /// 1. lowercases it;
    /// 2. strips everything except `a-z`, `0-9`, spaces and hyphens;
    /// 3. collapses runs of spaces and hyphens into a single hyphen;
    /// 4. trims leading and trailing hyphens.
    ///
    /// [`None`] is returned if nothing is left of the `title`.
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        let mut slug = String::with_capacity(title.len());
        for c in title.to_lowercase().chars() {
            match c {
                'a'..='z' | '0'..='9' => slug.push(c),
                ' ' | '-' => {
                    if !slug.is_empty() && !slug.ends_with('-') {
                        slug.push('-');
                    }
                }
                _ => {}
            }
        }
        while slug.ends_with('-') {
            _ = slug.pop();
        }

        (!slug.is_empty()).then_some(Self(slug))
    }

    /// Returns the `n`th collision candidate of this base [`Slug`].
    ///
    /// The `0`th candidate is the base itself, the rest have `-{n}` appended.
    #[must_use]
    pub fn candidate(&self, n: u32) -> Self {
        if n == 0 {
            self.clone()
        } else {
            Self(format!("{}-{n}", self.0))
        }
    }

    /// Checks whether the given `slug` is a valid [`Slug`].
    fn check(slug: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Slug`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex")
        });

        let slug = slug.as_ref();
        slug.len() <= 600 && REGEX.is_match(slug)
    }
}

impl std::str::FromStr for Slug {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Slug`")
    }
}
