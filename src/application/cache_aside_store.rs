//! Cache-aside decorator over a durable short URL store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{ShortUrl, ShortUrlId, Statistics};
use crate::domain::repositories::ShortUrlRepository;
use crate::domain::value_objects::{OriginalUrl, ShortCode};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Fronts a durable [`ShortUrlRepository`] with a [`CacheService`].
///
/// # Contract
///
/// - `find_by_short_code` is look-aside: cache first, durable store on miss,
///   and a live result read from the store is written back to the cache.
///   Misses are never cached, so a code created a moment later is visible at
///   once.
/// - `save` and `create_with_statistics` are write-through: the durable write
///   happens first, then the cache entry for the code is refreshed (live) or
///   evicted (soft-deleted). A new code is cached only once its statistics
///   row is committed.
/// - `exists_by_short_code`, `find_by_original_url` and `find_by_id` always
///   read the durable store. A uniqueness check must never trust the cache,
///   because an evicted entry would read as "free".
///
/// Cache failures are logged and treated as misses; the durable store wins
/// any disagreement.
pub struct CacheAsideStore<R: ShortUrlRepository> {
    store: Arc<R>,
    cache: Arc<dyn CacheService>,
    ttl_seconds: Option<u64>,
}

impl<R: ShortUrlRepository> CacheAsideStore<R> {
    pub fn new(store: Arc<R>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            store,
            cache,
            ttl_seconds: None,
        }
    }

    /// Overrides the cache backend's default TTL for entries written here.
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn cache(&self) -> &Arc<dyn CacheService> {
        &self.cache
    }

    async fn cached(&self, code: &ShortCode) -> Option<ShortUrl> {
        match self.cache.get(code.as_str()).await {
            Ok(Some(short_url)) if short_url.short_code() == code && !short_url.is_deleted() => {
                Some(short_url)
            }
            Ok(Some(_)) => {
                warn!(short_code = %code, "Evicting stale cache entry");
                self.evict(code).await;
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(short_code = %code, error = %e, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn populate(&self, short_url: &ShortUrl) {
        if let Err(e) = self.cache.put(short_url, self.ttl_seconds).await {
            warn!(short_code = %short_url.short_code(), error = %e, "Failed to cache short URL");
        }
    }

    async fn evict(&self, code: &ShortCode) {
        if let Err(e) = self.cache.evict(code.as_str()).await {
            warn!(short_code = %code, error = %e, "Failed to evict short URL from cache");
        }
    }
}

#[async_trait]
impl<R: ShortUrlRepository> ShortUrlRepository for CacheAsideStore<R> {
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>, AppError> {
        if let Some(short_url) = self.cached(code).await {
            debug!(short_code = %code, "Cache HIT");
            metrics::counter!("cache_hits_total").increment(1);
            return Ok(Some(short_url));
        }

        debug!(short_code = %code, "Cache MISS");
        metrics::counter!("cache_misses_total").increment(1);

        let found = self.store.find_by_short_code(code).await?;
        if let Some(short_url) = &found
            && !short_url.is_deleted()
        {
            self.populate(short_url).await;
        }

        Ok(found)
    }

    async fn find_by_original_url(
        &self,
        url: &OriginalUrl,
    ) -> Result<Option<ShortUrl>, AppError> {
        self.store.find_by_original_url(url).await
    }

    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool, AppError> {
        self.store.exists_by_short_code(code).await
    }

    async fn find_by_id(&self, id: ShortUrlId) -> Result<Option<ShortUrl>, AppError> {
        self.store.find_by_id(id).await
    }

    async fn create_with_statistics(
        &self,
        short_url: &ShortUrl,
        statistics: &Statistics,
    ) -> Result<ShortUrl, AppError> {
        let created = self
            .store
            .create_with_statistics(short_url, statistics)
            .await?;
        self.populate(&created).await;
        Ok(created)
    }

    async fn save(&self, short_url: &ShortUrl) -> Result<ShortUrl, AppError> {
        let saved = self.store.save(short_url).await?;

        if saved.is_deleted() {
            self.evict(saved.short_code()).await;
        } else {
            self.populate(&saved).await;
        }

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::StatisticsId;
    use crate::domain::repositories::MockShortUrlRepository;
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockCacheService};

    fn sample() -> ShortUrl {
        ShortUrl::create(
            OriginalUrl::parse("https://example.com/path").unwrap(),
            ShortCode::parse("abc1234").unwrap(),
            StatisticsId::new(),
        )
    }

    fn code() -> ShortCode {
        ShortCode::parse("abc1234").unwrap()
    }

    #[tokio::test]
    async fn test_find_after_save_is_served_from_cache() {
        let mut mock_repo = MockShortUrlRepository::new();
        let short_url = sample();
        let saved = short_url.clone();

        mock_repo
            .expect_save()
            .times(1)
            .returning(move |_| Ok(saved.clone()));
        mock_repo.expect_find_by_short_code().times(0);

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());

        store.save(&short_url).await.unwrap();
        let found = store.find_by_short_code(&code()).await.unwrap();

        assert_eq!(found, Some(short_url));
    }

    #[tokio::test]
    async fn test_miss_reads_store_and_populates_cache() {
        let mut mock_repo = MockShortUrlRepository::new();
        let short_url = sample();
        let from_store = short_url.clone();

        mock_repo
            .expect_find_by_short_code()
            .times(1)
            .returning(move |_| Ok(Some(from_store.clone())));

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());

        let first = store.find_by_short_code(&code()).await.unwrap();
        let second = store.find_by_short_code(&code()).await.unwrap();

        assert_eq!(first, Some(short_url.clone()));
        assert_eq!(second, Some(short_url));
        assert!(cache.contains("abc1234"));
    }

    #[tokio::test]
    async fn test_store_miss_is_not_cached() {
        let mut mock_repo = MockShortUrlRepository::new();
        let short_url = sample();
        let created = short_url.clone();
        let mut calls = 0;

        mock_repo
            .expect_find_by_short_code()
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Ok(None)
                } else {
                    Ok(Some(created.clone()))
                }
            });

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());

        assert!(store.find_by_short_code(&code()).await.unwrap().is_none());
        assert!(cache.is_empty());
        assert_eq!(
            store.find_by_short_code(&code()).await.unwrap(),
            Some(short_url)
        );
    }

    #[tokio::test]
    async fn test_saving_deleted_evicts() {
        let mut mock_repo = MockShortUrlRepository::new();
        let mut short_url = sample();

        mock_repo.expect_save().returning(|s| Ok(s.clone()));

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());

        store.save(&short_url).await.unwrap();
        assert!(cache.contains("abc1234"));

        short_url.soft_delete().unwrap();
        store.save(&short_url).await.unwrap();

        assert!(!cache.contains("abc1234"));
    }

    #[tokio::test]
    async fn test_deleted_row_from_store_is_returned_but_not_cached() {
        let mut mock_repo = MockShortUrlRepository::new();
        let mut short_url = sample();
        short_url.soft_delete().unwrap();
        let from_store = short_url.clone();

        mock_repo
            .expect_find_by_short_code()
            .returning(move |_| Ok(Some(from_store.clone())));

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());

        let found = store.find_by_short_code(&code()).await.unwrap().unwrap();

        assert!(found.is_deleted());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_is_not_cached() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo
            .expect_create_with_statistics()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", serde_json::json!({}))));

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());
        let short_url = sample();
        let statistics = Statistics::create_with_id(short_url.statistics_id(), short_url.id());

        let result = store.create_with_statistics(&short_url, &statistics).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_create_populates_cache() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo
            .expect_create_with_statistics()
            .times(1)
            .returning(|s, _| Ok(s.clone()));

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());
        let short_url = sample();
        let statistics = Statistics::create_with_id(short_url.statistics_id(), short_url.id());

        store
            .create_with_statistics(&short_url, &statistics)
            .await
            .unwrap();

        assert!(cache.contains("abc1234"));
    }

    #[tokio::test]
    async fn test_exists_never_consults_cache() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo
            .expect_exists_by_short_code()
            .times(1)
            .returning(|_| Ok(false));

        let mut mock_cache = MockCacheService::new();
        mock_cache.expect_get().times(0);

        let store = CacheAsideStore::new(Arc::new(mock_repo), Arc::new(mock_cache));

        assert!(!store.exists_by_short_code(&code()).await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_store() {
        let mut mock_repo = MockShortUrlRepository::new();
        let short_url = sample();
        let from_store = short_url.clone();
        mock_repo
            .expect_find_by_short_code()
            .times(1)
            .returning(move |_| Ok(Some(from_store.clone())));

        let mut mock_cache = MockCacheService::new();
        mock_cache
            .expect_get()
            .returning(|_| Err(CacheError::ConnectionError("down".to_string())));
        mock_cache.expect_put().returning(|_, _| Ok(()));

        let store = CacheAsideStore::new(Arc::new(mock_repo), Arc::new(mock_cache));

        assert_eq!(
            store.find_by_short_code(&code()).await.unwrap(),
            Some(short_url)
        );
    }

    #[tokio::test]
    async fn test_store_error_on_save_leaves_cache_untouched() {
        let mut mock_repo = MockShortUrlRepository::new();
        mock_repo
            .expect_save()
            .returning(|_| Err(AppError::conflict("Unique constraint violation", serde_json::json!({}))));

        let cache = Arc::new(MemoryCache::default());
        let store = CacheAsideStore::new(Arc::new(mock_repo), cache.clone());

        let result = store.save(&sample()).await;

        assert!(result.unwrap_err().is_conflict());
        assert!(cache.is_empty());
    }
}
