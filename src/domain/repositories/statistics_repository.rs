//! Repository trait for per short URL visit statistics.

use crate::domain::entities::{ShortUrlId, Statistics, StatisticsId};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for [`Statistics`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatisticsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStatisticsRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: StatisticsId) -> Result<Option<Statistics>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_short_url_id(
        &self,
        short_url_id: ShortUrlId,
    ) -> Result<Option<Statistics>, AppError>;

    /// Inserts or replaces a statistics row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short URL already has statistics
    /// under a different id.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save(&self, statistics: &Statistics) -> Result<Statistics, AppError>;

    /// Atomically counts one visit at `visited_at`.
    ///
    /// Concurrent calls for the same id must never lose an update.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the row existed and was updated
    /// - `Ok(false)` if there is no such row (already hard-deleted)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn increment(&self, id: StatisticsId, visited_at: DateTime<Utc>)
    -> Result<bool, AppError>;

    /// Hard-deletes a statistics row.
    ///
    /// Returns `Ok(false)` if the row was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete_by_id(&self, id: StatisticsId) -> Result<bool, AppError>;
}
