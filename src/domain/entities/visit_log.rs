//! VisitLog entity representing a single resolved redirect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ShortUrlId, VisitLogId};

/// One visit to a short URL.
///
/// An independent, append-only aggregate: it is never updated and is kept
/// when its short URL is deleted. Client metadata is optional to handle
/// missing headers gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLog {
    id: VisitLogId,
    short_url_id: ShortUrlId,
    visited_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl VisitLog {
    /// Records a visit happening now.
    pub fn create(
        short_url_id: ShortUrlId,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self::create_at(short_url_id, Utc::now(), ip_address, user_agent)
    }

    /// Records a visit that happened at `visited_at`.
    pub fn create_at(
        short_url_id: ShortUrlId,
        visited_at: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self::create_with_id(
            VisitLogId::new(),
            short_url_id,
            visited_at,
            ip_address,
            user_agent,
        )
    }

    /// Records a visit under an id chosen by the caller, typically the id
    /// carried by the visit event.
    pub fn create_with_id(
        id: VisitLogId,
        short_url_id: ShortUrlId,
        visited_at: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id,
            short_url_id,
            visited_at,
            ip_address: ip_address.filter(|s| !s.is_empty()),
            user_agent: user_agent.filter(|s| !s.is_empty()),
        }
    }

    pub fn restore(
        id: VisitLogId,
        short_url_id: ShortUrlId,
        visited_at: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id,
            short_url_id,
            visited_at,
            ip_address,
            user_agent,
        }
    }

    pub fn id(&self) -> VisitLogId {
        self.id
    }

    pub fn short_url_id(&self) -> ShortUrlId {
        self.short_url_id
    }

    pub fn visited_at(&self) -> DateTime<Utc> {
        self.visited_at
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}
