//! Repository trait for the append-only visit log.

use crate::domain::entities::{ShortUrlId, VisitLog};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for [`VisitLog`].
///
/// Append-only: there is no update or delete, and entries outlive their
/// short URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitLogRepository: Send + Sync {
    /// Appends one visit.
    ///
    /// Saving an entry whose id is already stored is a no-op, so re-delivered
    /// events do not duplicate history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save(&self, visit_log: &VisitLog) -> Result<VisitLog, AppError>;

    /// Lists visits for a short URL, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_short_url_id(&self, short_url_id: ShortUrlId)
    -> Result<Vec<VisitLog>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count_by_short_url_id(&self, short_url_id: ShortUrlId) -> Result<u64, AppError>;
}
