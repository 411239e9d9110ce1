//! Validated, immutable value types.
//!
//! Neither type can hold an invalid value: the only ways in are the
//! validating `parse` constructors, `TryFrom<String>` and serde
//! deserialisation, all of which run the same checks.

pub mod original_url;
pub mod short_code;

pub use original_url::{MAX_URL_LENGTH, OriginalUrl};
pub use short_code::{MAX_CODE_LENGTH, MIN_CODE_LENGTH, ShortCode};
