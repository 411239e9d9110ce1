//! Repository trait for short URL data access.

use crate::domain::entities::{ShortUrl, ShortUrlId, Statistics};
use crate::domain::value_objects::{OriginalUrl, ShortCode};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the [`ShortUrl`] aggregate.
///
/// The durable store is the source of truth. It must enforce uniqueness of
/// `short_code` at the storage level: `exists_by_short_code` followed by
/// `save` is a check-then-act race on its own, and the constraint is what
/// makes it safe.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryShortUrlRepository`] - In-process implementation
/// - [`crate::application::CacheAsideStore`] - Cache-fronted decorator over either
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Finds a short URL by code, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>, AppError>;

    /// Finds the live (non-deleted) short URL for an original URL.
    ///
    /// Used to avoid creating a second code for the same URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_original_url(&self, url: &OriginalUrl)
    -> Result<Option<ShortUrl>, AppError>;

    /// Reports whether any short URL, deleted or not, holds `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: ShortUrlId) -> Result<Option<ShortUrl>, AppError>;

    /// Inserts a new short URL together with its statistics row.
    ///
    /// Both rows are written in one durable unit: either both exist
    /// afterwards or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if another short URL already holds the
    /// same short code.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create_with_statistics(
        &self,
        short_url: &ShortUrl,
        statistics: &Statistics,
    ) -> Result<ShortUrl, AppError>;

    /// Inserts a new short URL or updates an existing one (matched by id).
    ///
    /// Only `deleted_at` is mutable after insertion, and only once: a stored
    /// row that is already deleted is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if another short URL already holds the
    /// same short code, or if the stored row is already deleted.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save(&self, short_url: &ShortUrl) -> Result<ShortUrl, AppError>;
}
