//! URL slugs for campaigns, events and news posts.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum slug length accepted from administrators.
pub const SLUG_MAX: usize = 120;

/// Error returned for malformed slugs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug must be at most {SLUG_MAX} characters")]
    TooLong,
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacters,
}

/// Validated slug.
///
/// # Examples
/// ```
/// use vetpal::domain::Slug;
///
/// assert!(Slug::new("spring-drive-2025").is_ok());
/// assert!(Slug::new("Spring Drive").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if value.is_empty() || value.trim() != value {
            return Err(SlugError::Empty);
        }
        if value.len() > SLUG_MAX {
            return Err(SlugError::TooLong);
        }
        if !has_allowed_slug_chars(&value) {
            return Err(SlugError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("winter-coat-drive", Ok(()))]
    #[case("2025", Ok(()))]
    #[case("", Err(SlugError::Empty))]
    #[case(" padded", Err(SlugError::Empty))]
    #[case("Upper", Err(SlugError::InvalidCharacters))]
    #[case("under_score", Err(SlugError::InvalidCharacters))]
    fn slug_validation(#[case] raw: &str, #[case] expected: Result<(), SlugError>) {
        assert_eq!(Slug::new(raw).map(|_| ()), expected);
    }

    #[rstest]
    fn overlong_slug_is_rejected() {
        assert_eq!(Slug::new("a".repeat(SLUG_MAX + 1)), Err(SlugError::TooLong));
    }
}
