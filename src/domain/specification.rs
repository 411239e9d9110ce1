//! Reusable URL format rule.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::error::DomainError;
use crate::domain::value_objects::{MAX_URL_LENGTH, OriginalUrl};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[\w\-]+(\.[\w\-]+)+[/#?]?.*$").expect("URL pattern is valid")
});

/// The single URL format rule used by [`OriginalUrl`] and by any workflow
/// that needs to re-check a URL.
///
/// A URL satisfies the rule when it is non-empty, at most
/// [`MAX_URL_LENGTH`] characters, uses `http` or `https` (any case) and has a
/// host made of at least two dot-separated labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlFormatSpecification;

impl UrlFormatSpecification {
    pub fn new() -> Self {
        Self
    }

    pub fn is_satisfied_by(&self, url: &OriginalUrl) -> bool {
        Self::check(url.as_str()).is_ok()
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] when the rule is not satisfied.
    pub fn validate(&self, url: &OriginalUrl) -> Result<(), DomainError> {
        Self::check(url.as_str())
    }

    /// Applies the rule to a raw string.
    pub(crate) fn check(value: &str) -> Result<(), DomainError> {
        if value.is_empty() {
            return Err(DomainError::InvalidUrl("URL must not be empty".to_string()));
        }

        let length = value.chars().count();
        if length > MAX_URL_LENGTH {
            return Err(DomainError::InvalidUrl(format!(
                "URL exceeds {MAX_URL_LENGTH} characters ({length})"
            )));
        }

        if !URL_PATTERN.is_match(value) {
            return Err(DomainError::InvalidUrl(
                "URL must be http(s)://host with a dotted host".to_string(),
            ));
        }

        Ok(())
    }
}
