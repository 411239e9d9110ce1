//! Short code value type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 7;

/// A 6-7 character Base62 short code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Validates `value` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidShortCode`] if the value is empty, not
    /// 6-7 characters long, or contains anything outside `[a-zA-Z0-9]`.
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        check(&value)?;
        Ok(Self(value))
    }

    pub fn is_valid_format(&self) -> bool {
        check(&self.0).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check(value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::InvalidShortCode(
            "short code must not be empty".to_string(),
        ));
    }

    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&value.len()) {
        return Err(DomainError::InvalidShortCode(format!(
            "short code must be {MIN_CODE_LENGTH}-{MAX_CODE_LENGTH} characters, got {}",
            value.chars().count()
        )));
    }

    if !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidShortCode(format!(
            "short code '{value}' must contain only Base62 characters"
        )));
    }

    Ok(())
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShortCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for ShortCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}
