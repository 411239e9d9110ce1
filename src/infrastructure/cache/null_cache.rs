//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::ShortUrl;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every lookup misses, so every read goes to the durable store.
///
/// # Use Cases
///
/// - Fallback when the Redis connection fails at startup
/// - Testing scenarios where caching should be bypassed
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _short_code: &str) -> CacheResult<Option<ShortUrl>> {
        Ok(None)
    }

    async fn put(&self, _short_url: &ShortUrl, _ttl_seconds: Option<u64>) -> CacheResult<()> {
        Ok(())
    }

    async fn evict(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
