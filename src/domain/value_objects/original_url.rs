//! Original (long) URL value type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::specification::UrlFormatSpecification;

/// Maximum accepted URL length, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// A long URL accepted for shortening.
///
/// Always an `http://` or `https://` URL with a dotted host and at most
/// [`MAX_URL_LENGTH`] characters. The string is stored exactly as given; it is
/// the canonical form hashed by [`crate::utils::code_generator::CodeGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OriginalUrl(String);

impl OriginalUrl {
    /// Validates `value` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the value is empty, longer than
    /// [`MAX_URL_LENGTH`] characters, or not an `http(s)://host...` URL.
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        UrlFormatSpecification::check(&value)?;
        Ok(Self(value))
    }

    /// Re-runs the format rule against the wrapped value.
    pub fn is_valid_format(&self) -> bool {
        UrlFormatSpecification::check(&self.0).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OriginalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OriginalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OriginalUrl {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for OriginalUrl {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<OriginalUrl> for String {
    fn from(url: OriginalUrl) -> Self {
        url.0
    }
}
