//! Domain events driving the statistics and visit-log lifecycle.
//!
//! Events are published after the state change they describe and handled
//! asynchronously, so neither [`crate::domain::entities::ShortUrl`] nor the
//! redirect path touches `Statistics` or `VisitLog` directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{ShortUrlId, StatisticsId, VisitLogId};

/// A short URL resolved for a redirect.
///
/// `visit_id` is fixed when the event is created and becomes the id of the
/// recorded [`crate::domain::entities::VisitLog`], so redelivering the same
/// event never records the visit twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlVisitedEvent {
    pub visit_id: VisitLogId,
    pub short_url_id: ShortUrlId,
    pub statistics_id: StatisticsId,
    pub visited_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl UrlVisitedEvent {
    /// Creates a visit event stamped with the current time.
    pub fn new(
        short_url_id: ShortUrlId,
        statistics_id: StatisticsId,
        ip_address: Option<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            visit_id: VisitLogId::new(),
            short_url_id,
            statistics_id,
            visited_at: Utc::now(),
            ip_address,
            user_agent: user_agent.map(|s| s.to_string()),
        }
    }
}

/// A short URL was soft-deleted; its statistics must be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlDeletedEvent {
    pub short_url_id: ShortUrlId,
    pub statistics_id: StatisticsId,
}

impl ShortUrlDeletedEvent {
    pub fn new(short_url_id: ShortUrlId, statistics_id: StatisticsId) -> Self {
        Self {
            short_url_id,
            statistics_id,
        }
    }
}

/// Discriminant used to register handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    UrlVisited,
    ShortUrlDeleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UrlVisited => "url_visited",
            EventKind::ShortUrlDeleted => "short_url_deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UrlVisited(UrlVisitedEvent),
    ShortUrlDeleted(ShortUrlDeletedEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::UrlVisited(_) => EventKind::UrlVisited,
            DomainEvent::ShortUrlDeleted(_) => EventKind::ShortUrlDeleted,
        }
    }

    pub fn short_url_id(&self) -> ShortUrlId {
        match self {
            DomainEvent::UrlVisited(e) => e.short_url_id,
            DomainEvent::ShortUrlDeleted(e) => e.short_url_id,
        }
    }
}

impl From<UrlVisitedEvent> for DomainEvent {
    fn from(event: UrlVisitedEvent) -> Self {
        DomainEvent::UrlVisited(event)
    }
}

impl From<ShortUrlDeletedEvent> for DomainEvent {
    fn from(event: ShortUrlDeletedEvent) -> Self {
        DomainEvent::ShortUrlDeleted(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_event_creation_full() {
        let short_url_id = ShortUrlId::new();
        let statistics_id = StatisticsId::new();
        let event = UrlVisitedEvent::new(
            short_url_id,
            statistics_id,
            Some("192.168.1.1".to_string()),
            Some("Mozilla/5.0"),
        );

        assert_eq!(event.short_url_id, short_url_id);
        assert_eq!(event.statistics_id, statistics_id);
        assert_eq!(event.ip_address.as_deref(), Some("192.168.1.1"));
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_each_visit_gets_its_own_id() {
        let short_url_id = ShortUrlId::new();
        let statistics_id = StatisticsId::new();
        let first = UrlVisitedEvent::new(short_url_id, statistics_id, None, None);
        let second = UrlVisitedEvent::new(short_url_id, statistics_id, None, None);

        assert_ne!(first.visit_id, second.visit_id);
    }

    #[test]
    fn test_visit_event_creation_minimal() {
        let event = UrlVisitedEvent::new(ShortUrlId::new(), StatisticsId::new(), None, None);

        assert!(event.ip_address.is_none());
        assert!(event.user_agent.is_none());
    }

    #[test]
    fn test_kind_dispatch() {
        let visited: DomainEvent =
            UrlVisitedEvent::new(ShortUrlId::new(), StatisticsId::new(), None, None).into();
        let deleted: DomainEvent =
            ShortUrlDeletedEvent::new(ShortUrlId::new(), StatisticsId::new()).into();

        assert_eq!(visited.kind(), EventKind::UrlVisited);
        assert_eq!(deleted.kind(), EventKind::ShortUrlDeleted);
        assert_eq!(deleted.kind().as_str(), "short_url_deleted");
    }

    #[test]
    fn test_serialized_form_is_tagged() {
        let event: DomainEvent =
            ShortUrlDeletedEvent::new(ShortUrlId::new(), StatisticsId::new()).into();

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "short_url_deleted");
    }
}
