//! Utility functions for short code generation.
//!
//! - [`base62`] - Base62 encoding of 64-bit values
//! - [`code_generator`] - Deterministic hash-based code derivation with collision rounds

pub mod base62;
pub mod code_generator;
