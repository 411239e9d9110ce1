//! In-process cache backed by a concurrent map.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::ShortUrl;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Entry {
    short_url: ShortUrl,
    expires_at: Instant,
}

/// Thread-safe in-memory cache mapping short code -> snapshot.
///
/// Backed by a `DashMap` so reads are concurrent. Expired entries are dropped
/// on lookup and by [`MemoryCache::purge_expired`], which
/// [`MemoryCache::spawn_sweeper`] runs periodically. Used when Redis is not
/// configured and in tests.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    /// Number of entries currently cached, including expired ones not yet
    /// dropped.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, short_code: &str) -> bool {
        self.inner
            .get(short_code)
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.inner)
    }

    /// Spawns a task purging expired entries every `every`.
    ///
    /// The task holds only a weak reference and exits once the last clone of
    /// the cache is dropped.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let inner: Weak<DashMap<String, Entry>> = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            info!(interval_ms = every.as_millis() as u64, "Cache sweeper started");

            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let Some(map) = inner.upgrade() else {
                    debug!("Cache dropped, sweeper exiting");
                    return;
                };
                let removed = purge(&map);
                if removed > 0 {
                    debug!(removed, remaining = map.len(), "Cache sweep");
                }
            }
        })
    }
}

fn purge(map: &DashMap<String, Entry>) -> usize {
    let now = Instant::now();
    let before = map.len();
    map.retain(|_, e| e.expires_at > now);
    before.saturating_sub(map.len())
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(3600)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, short_code: &str) -> CacheResult<Option<ShortUrl>> {
        let now = Instant::now();

        if let Some(entry) = self.inner.get(short_code) {
            if entry.expires_at > now {
                debug!(short_code, "Cache HIT");
                return Ok(Some(entry.short_url.clone()));
            }
        } else {
            debug!(short_code, "Cache MISS");
            return Ok(None);
        }

        self.inner.remove_if(short_code, |_, e| e.expires_at <= now);
        debug!(short_code, "Cache EXPIRED");
        Ok(None)
    }

    async fn put(&self, short_url: &ShortUrl, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let ttl = ttl_seconds.map_or(self.default_ttl, Duration::from_secs);
        self.inner.insert(
            short_url.short_code().as_str().to_string(),
            Entry {
                short_url: short_url.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        debug!(short_code = %short_url.short_code(), ttl_seconds = ttl.as_secs(), "Cache SET");
        Ok(())
    }

    async fn evict(&self, short_code: &str) -> CacheResult<()> {
        if self.inner.remove(short_code).is_some() {
            debug!(short_code, "Cache INVALIDATE");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
