use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::event_bus::EventHandler;
use crate::domain::events::DomainEvent;
use crate::domain::repositories::StatisticsRepository;
use crate::error::AppError;

/// Hard-deletes the Statistics row of a soft-deleted ShortUrl.
///
/// Visit logs for the same ShortUrl are left in place. Re-delivery after the
/// row is gone is a no-op.
pub struct StatisticsCleanupHandler<S: StatisticsRepository> {
    statistics: Arc<S>,
}

impl<S: StatisticsRepository> StatisticsCleanupHandler<S> {
    pub fn new(statistics: Arc<S>) -> Self {
        Self { statistics }
    }
}

#[async_trait]
impl<S: StatisticsRepository + 'static> EventHandler for StatisticsCleanupHandler<S> {
    fn name(&self) -> &'static str {
        "statistics_cleanup"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), AppError> {
        let DomainEvent::ShortUrlDeleted(deleted) = event else {
            return Ok(());
        };

        if self.statistics.delete_by_id(deleted.statistics_id).await? {
            info!(
                statistics_id = %deleted.statistics_id,
                short_url_id = %deleted.short_url_id,
                "Statistics removed"
            );
        } else {
            debug!(statistics_id = %deleted.statistics_id, "Statistics already removed");
        }

        Ok(())
    }
}
