//! Deterministic short code generation.
//!
//! A code is derived from the SHA-256 digest of the URL string: the first 8
//! digest bytes are read as a big-endian `u64`, Base62-encoded and padded to
//! 11 digits, and the last [`CODE_LENGTH`] digits form the code. The same URL
//! therefore always maps to the same code, on every run and every node.
//!
//! On a collision the URL is salted with the attempt number and hashed again,
//! up to [`MAX_REGENERATE_ATTEMPTS`] times.

use sha2::{Digest, Sha256};

use crate::domain::error::DomainError;
use crate::domain::value_objects::{OriginalUrl, ShortCode};
use crate::utils::base62;

/// Length of generated codes.
pub const CODE_LENGTH: usize = 7;

/// Regeneration rounds allowed after the initial candidate.
pub const MAX_REGENERATE_ATTEMPTS: u32 = 3;

/// Derives short codes from original URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Returns the initial candidate code for `url`.
    pub fn generate(&self, url: &OriginalUrl) -> ShortCode {
        derive(url.as_str())
    }

    /// Returns the candidate for collision round `attempt` (1-based).
    ///
    /// Attempt `0` is the initial candidate, identical to [`Self::generate`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::GenerationExhausted`] when `attempt` exceeds
    /// [`MAX_REGENERATE_ATTEMPTS`].
    pub fn regenerate(&self, url: &OriginalUrl, attempt: u32) -> Result<ShortCode, DomainError> {
        if attempt > MAX_REGENERATE_ATTEMPTS {
            return Err(DomainError::GenerationExhausted { attempt });
        }
        if attempt == 0 {
            return Ok(self.generate(url));
        }

        Ok(derive(&format!("{}:{}", url.as_str(), attempt)))
    }
}

fn derive(input: &str) -> ShortCode {
    let digest = Sha256::digest(input.as_bytes());

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix);

    let encoded = base62::encode_padded(value);
    let code = &encoded[encoded.len() - CODE_LENGTH..];

    ShortCode::parse(code).expect("generated code is always 7 Base62 characters")
}
