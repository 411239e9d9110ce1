//! Read side of the visit lifecycle.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{ShortUrlId, Statistics, VisitLog};
use crate::domain::repositories::{StatisticsRepository, VisitLogRepository};
use crate::error::AppError;

/// Exposes counters and visit history for a short URL.
///
/// Counters live in Statistics and disappear with the short URL. Visit logs
/// are an audit trail and remain readable after deletion.
pub struct StatsService<S: StatisticsRepository, V: VisitLogRepository> {
    statistics: Arc<S>,
    visit_logs: Arc<V>,
}

impl<S: StatisticsRepository, V: VisitLogRepository> StatsService<S, V> {
    pub fn new(statistics: Arc<S>, visit_logs: Arc<V>) -> Self {
        Self {
            statistics,
            visit_logs,
        }
    }

    /// Returns the Statistics of a live short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the short URL never existed or has
    /// been deleted and its statistics cleaned up.
    pub async fn statistics_for(&self, short_url_id: ShortUrlId) -> Result<Statistics, AppError> {
        self.statistics
            .find_by_short_url_id(short_url_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Statistics not found",
                    json!({ "short_url_id": short_url_id.to_string() }),
                )
            })
    }

    /// Recorded visits, most recent first.
    pub async fn visit_history(&self, short_url_id: ShortUrlId) -> Result<Vec<VisitLog>, AppError> {
        self.visit_logs.find_by_short_url_id(short_url_id).await
    }

    /// Number of recorded visits, counted from the visit logs.
    pub async fn visit_count(&self, short_url_id: ShortUrlId) -> Result<u64, AppError> {
        self.visit_logs.count_by_short_url_id(short_url_id).await
    }
}
