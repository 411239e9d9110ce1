//! Cache service trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ShortUrl;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching [`ShortUrl`] snapshots keyed by short code.
///
/// The cache has no authority of its own: it may lose entries at any time and
/// callers must fall back to the durable store. Implementations must be
/// thread-safe and degrade to misses on backend failure.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the snapshot cached under `short_code`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(short_url))` on cache hit
    /// - `Ok(None)` on cache miss, or on a backend or decoding error (fail-open)
    async fn get(&self, short_code: &str) -> CacheResult<Option<ShortUrl>>;

    /// Stores a snapshot under its short code with optional TTL in seconds
    /// (implementation-specific default if `None`).
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers. Implementations should log
    /// errors and return `Ok(())` to avoid disrupting the request flow.
    async fn put(&self, short_url: &ShortUrl, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Removes the snapshot cached under `short_code`.
    async fn evict(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
