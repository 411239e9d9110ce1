//! Errors raised by value types and aggregate lifecycle methods.

use thiserror::Error;

use crate::domain::entities::ShortUrlId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The URL is empty, too long, or not an `http(s)://host` URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The short code is not 6-7 Base62 characters.
    #[error("Invalid short code: {0}")]
    InvalidShortCode(String),

    /// Regeneration was requested past the last permitted attempt.
    #[error("Short code generation exhausted at attempt {attempt}")]
    GenerationExhausted { attempt: u32 },

    /// `soft_delete` was called on a short URL that is already deleted.
    #[error("Short URL {id} is already deleted")]
    AlreadyDeleted { id: ShortUrlId },
}
