use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::VisitLog;
use crate::domain::event_bus::EventHandler;
use crate::domain::events::DomainEvent;
use crate::domain::repositories::VisitLogRepository;
use crate::error::AppError;

/// Appends a [`VisitLog`] for each [`DomainEvent::UrlVisited`].
///
/// Logs are written regardless of the ShortUrl's current state and are never
/// removed by deletion. The log takes the event's `visit_id`, so a retried or
/// redelivered event lands on the same row.
pub struct VisitLogRecorder<V: VisitLogRepository> {
    visit_logs: Arc<V>,
}

impl<V: VisitLogRepository> VisitLogRecorder<V> {
    pub fn new(visit_logs: Arc<V>) -> Self {
        Self { visit_logs }
    }
}

#[async_trait]
impl<V: VisitLogRepository + 'static> EventHandler for VisitLogRecorder<V> {
    fn name(&self) -> &'static str {
        "visit_log"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), AppError> {
        let DomainEvent::UrlVisited(visit) = event else {
            return Ok(());
        };

        let log = VisitLog::create_with_id(
            visit.visit_id,
            visit.short_url_id,
            visit.visited_at,
            visit.ip_address.clone(),
            visit.user_agent.clone(),
        );
        self.visit_logs.save(&log).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ShortUrlId, StatisticsId};
    use crate::domain::events::{ShortUrlDeletedEvent, UrlVisitedEvent};
    use crate::domain::repositories::MockVisitLogRepository;
    use crate::infrastructure::persistence::InMemoryVisitLogRepository;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stores the first write but reports it as failed, like a commit whose
    /// acknowledgement was lost.
    struct LostAckStore {
        inner: InMemoryVisitLogRepository,
        failed_once: AtomicBool,
    }

    #[async_trait]
    impl VisitLogRepository for LostAckStore {
        async fn save(&self, visit_log: &VisitLog) -> Result<VisitLog, AppError> {
            let saved = self.inner.save(visit_log).await?;
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(AppError::internal("Database error", json!({})));
            }
            Ok(saved)
        }

        async fn find_by_short_url_id(
            &self,
            short_url_id: ShortUrlId,
        ) -> Result<Vec<VisitLog>, AppError> {
            self.inner.find_by_short_url_id(short_url_id).await
        }

        async fn count_by_short_url_id(&self, short_url_id: ShortUrlId) -> Result<u64, AppError> {
            self.inner.count_by_short_url_id(short_url_id).await
        }
    }

    #[tokio::test]
    async fn test_records_visit_details() {
        let short_url_id = ShortUrlId::new();
        let event = UrlVisitedEvent::new(
            short_url_id,
            StatisticsId::new(),
            Some("10.0.0.1".to_string()),
            Some("curl/8.0"),
        );
        let visited_at = event.visited_at;
        let visit_id = event.visit_id;

        let mut mock_repo = MockVisitLogRepository::new();
        mock_repo
            .expect_save()
            .withf(move |log| {
                log.id() == visit_id
                    && log.short_url_id() == short_url_id
                    && log.visited_at() == visited_at
                    && log.ip_address() == Some("10.0.0.1")
                    && log.user_agent() == Some("curl/8.0")
            })
            .times(1)
            .returning(|log| Ok(log.clone()));

        let handler = VisitLogRecorder::new(Arc::new(mock_repo));

        assert!(handler.handle(&event.into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_records_anonymous_visit() {
        let mut mock_repo = MockVisitLogRepository::new();
        mock_repo
            .expect_save()
            .withf(|log| log.ip_address().is_none() && log.user_agent().is_none())
            .times(1)
            .returning(|log| Ok(log.clone()));

        let handler = VisitLogRecorder::new(Arc::new(mock_repo));
        let event = UrlVisitedEvent::new(ShortUrlId::new(), StatisticsId::new(), None, None);

        assert!(handler.handle(&event.into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_retried_visit_is_logged_once() {
        let repo = Arc::new(LostAckStore {
            inner: InMemoryVisitLogRepository::new(),
            failed_once: AtomicBool::new(false),
        });
        let handler = VisitLogRecorder::new(Arc::clone(&repo));
        let short_url_id = ShortUrlId::new();
        let event: DomainEvent =
            UrlVisitedEvent::new(short_url_id, StatisticsId::new(), None, None).into();

        assert!(handler.handle(&event).await.is_err());
        assert!(handler.handle(&event).await.is_ok());

        assert_eq!(repo.count_by_short_url_id(short_url_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ignores_deletion_events() {
        let mut mock_repo = MockVisitLogRepository::new();
        mock_repo.expect_save().times(0);

        let handler = VisitLogRecorder::new(Arc::new(mock_repo));
        let event = ShortUrlDeletedEvent::new(ShortUrlId::new(), StatisticsId::new());

        assert!(handler.handle(&event.into()).await.is_ok());
    }
}
