//! In-process repository implementations.
//!
//! Same semantics as the PostgreSQL repositories: short code uniqueness is
//! enforced under the write lock, and statistics increments are a single
//! read-modify-write under that lock, so concurrent visits never lose
//! updates.
//!
//! The short URL store shares the statistics rows it was built with, so a
//! short URL and its statistics are inserted under both write locks at once.
//! Locks are always taken short URLs first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{ShortUrl, ShortUrlId, Statistics, StatisticsId, VisitLog, VisitLogId};
use crate::domain::error::DomainError;
use crate::domain::repositories::{ShortUrlRepository, StatisticsRepository, VisitLogRepository};
use crate::domain::value_objects::{OriginalUrl, ShortCode};
use crate::error::AppError;

type ShortUrlRows = HashMap<ShortUrlId, ShortUrl>;
type StatisticsRows = HashMap<StatisticsId, Statistics>;

/// In-memory [`ShortUrlRepository`].
#[derive(Clone)]
pub struct InMemoryShortUrlRepository {
    rows: Arc<RwLock<ShortUrlRows>>,
    statistics: Arc<RwLock<StatisticsRows>>,
}

impl InMemoryShortUrlRepository {
    /// Creates a store whose `create_with_statistics` writes into
    /// `statistics`.
    pub fn new(statistics: &InMemoryStatisticsRepository) -> Self {
        Self {
            rows: Arc::default(),
            statistics: Arc::clone(&statistics.rows),
        }
    }

    /// Returns the number of stored short URLs, deleted ones included.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|s| s.short_code() == code).cloned())
    }

    async fn find_by_original_url(
        &self,
        url: &OriginalUrl,
    ) -> Result<Option<ShortUrl>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|s| s.original_url() == url && !s.is_deleted())
            .min_by_key(|s| s.created_at())
            .cloned())
    }

    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool, AppError> {
        let rows = self.rows.read().await;
        Ok(rows.values().any(|s| s.short_code() == code))
    }

    async fn find_by_id(&self, id: ShortUrlId) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create_with_statistics(
        &self,
        short_url: &ShortUrl,
        statistics: &Statistics,
    ) -> Result<ShortUrl, AppError> {
        let mut rows = self.rows.write().await;
        let mut statistics_rows = self.statistics.write().await;

        if rows.contains_key(&short_url.id()) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_urls_pkey" }),
            ));
        }
        check_code_free(&rows, short_url)?;
        check_statistics_free(&statistics_rows, statistics)?;

        statistics_rows.insert(statistics.id(), statistics.clone());
        rows.insert(short_url.id(), short_url.clone());
        Ok(short_url.clone())
    }

    async fn save(&self, short_url: &ShortUrl) -> Result<ShortUrl, AppError> {
        let mut rows = self.rows.write().await;

        check_code_free(&rows, short_url)?;
        if rows.get(&short_url.id()).is_some_and(|s| s.is_deleted()) {
            return Err(DomainError::AlreadyDeleted { id: short_url.id() }.into());
        }

        rows.insert(short_url.id(), short_url.clone());
        Ok(short_url.clone())
    }
}

fn check_code_free(rows: &ShortUrlRows, short_url: &ShortUrl) -> Result<(), AppError> {
    let taken = rows
        .values()
        .any(|s| s.short_code() == short_url.short_code() && s.id() != short_url.id());
    if taken {
        return Err(AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": "short_urls_short_code_key" }),
        ));
    }
    Ok(())
}

fn check_statistics_free(rows: &StatisticsRows, statistics: &Statistics) -> Result<(), AppError> {
    let taken = rows
        .values()
        .any(|s| s.short_url_id() == statistics.short_url_id() && s.id() != statistics.id());
    if taken {
        return Err(AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": "statistics_short_url_id_key" }),
        ));
    }
    Ok(())
}

/// In-memory [`StatisticsRepository`].
#[derive(Clone, Default)]
pub struct InMemoryStatisticsRepository {
    rows: Arc<RwLock<StatisticsRows>>,
}

impl InMemoryStatisticsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryStatisticsRepository {
    async fn find_by_id(&self, id: StatisticsId) -> Result<Option<Statistics>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_short_url_id(
        &self,
        short_url_id: ShortUrlId,
    ) -> Result<Option<Statistics>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|s| s.short_url_id() == short_url_id)
            .cloned())
    }

    async fn save(&self, statistics: &Statistics) -> Result<Statistics, AppError> {
        let mut rows = self.rows.write().await;

        check_statistics_free(&rows, statistics)?;

        rows.insert(statistics.id(), statistics.clone());
        Ok(statistics.clone())
    }

    async fn increment(
        &self,
        id: StatisticsId,
        visited_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(statistics) => {
                statistics.record_visit(visited_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: StatisticsId) -> Result<bool, AppError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

/// In-memory [`VisitLogRepository`].
#[derive(Clone, Default)]
pub struct InMemoryVisitLogRepository {
    rows: Arc<RwLock<HashMap<VisitLogId, VisitLog>>>,
}

impl InMemoryVisitLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl VisitLogRepository for InMemoryVisitLogRepository {
    async fn save(&self, visit_log: &VisitLog) -> Result<VisitLog, AppError> {
        let mut rows = self.rows.write().await;
        let stored = rows
            .entry(visit_log.id())
            .or_insert_with(|| visit_log.clone());
        Ok(stored.clone())
    }

    async fn find_by_short_url_id(
        &self,
        short_url_id: ShortUrlId,
    ) -> Result<Vec<VisitLog>, AppError> {
        let rows = self.rows.read().await;
        let mut logs: Vec<VisitLog> = rows
            .values()
            .filter(|l| l.short_url_id() == short_url_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.visited_at().cmp(&a.visited_at()));
        Ok(logs)
    }

    async fn count_by_short_url_id(&self, short_url_id: ShortUrlId) -> Result<u64, AppError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|l| l.short_url_id() == short_url_id)
            .count() as u64)
    }
}
