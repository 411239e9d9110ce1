use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::event_bus::EventHandler;
use crate::domain::events::DomainEvent;
use crate::domain::repositories::StatisticsRepository;
use crate::error::AppError;

/// Bumps the visit counter for each [`DomainEvent::UrlVisited`].
///
/// The increment is delegated to the store as one atomic operation, so
/// concurrent deliveries for the same row never lose updates. A visit that
/// arrives after the row was hard-deleted is dropped silently.
pub struct VisitCountHandler<S: StatisticsRepository> {
    statistics: Arc<S>,
}

impl<S: StatisticsRepository> VisitCountHandler<S> {
    pub fn new(statistics: Arc<S>) -> Self {
        Self { statistics }
    }
}

#[async_trait]
impl<S: StatisticsRepository + 'static> EventHandler for VisitCountHandler<S> {
    fn name(&self) -> &'static str {
        "visit_count"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), AppError> {
        let DomainEvent::UrlVisited(visit) = event else {
            return Ok(());
        };

        let updated = self
            .statistics
            .increment(visit.statistics_id, visit.visited_at)
            .await?;

        if !updated {
            debug!(
                statistics_id = %visit.statistics_id,
                short_url_id = %visit.short_url_id,
                "Statistics already removed, visit not counted"
            );
        }

        Ok(())
    }
}
