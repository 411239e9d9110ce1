//! Statistics entity, owned 1:1 by a short URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ShortUrlId, StatisticsId};

/// Visit counter for a single short URL.
///
/// There is no "deleted" flag: when its short URL is soft-deleted the row is
/// removed from the store, and absence is the deleted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    id: StatisticsId,
    short_url_id: ShortUrlId,
    visit_count: u64,
    last_visited_at: Option<DateTime<Utc>>,
}

impl Statistics {
    /// Creates empty statistics for `short_url_id` with a fresh id.
    pub fn create(short_url_id: ShortUrlId) -> Self {
        Self::create_with_id(StatisticsId::new(), short_url_id)
    }

    /// Creates empty statistics under a pre-allocated id.
    ///
    /// Used when the id has already been handed to [`super::ShortUrl::create`].
    pub fn create_with_id(id: StatisticsId, short_url_id: ShortUrlId) -> Self {
        Self {
            id,
            short_url_id,
            visit_count: 0,
            last_visited_at: None,
        }
    }

    pub fn restore(
        id: StatisticsId,
        short_url_id: ShortUrlId,
        visit_count: u64,
        last_visited_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            short_url_id,
            visit_count,
            last_visited_at,
        }
    }

    /// Counts one visit happening now.
    pub fn increment(&mut self) {
        self.record_visit(Utc::now());
    }

    /// Counts one visit that happened at `visited_at`.
    ///
    /// Count and timestamp change together. Visits may arrive out of order,
    /// so the timestamp only moves forward.
    pub fn record_visit(&mut self, visited_at: DateTime<Utc>) {
        self.visit_count += 1;
        self.update_last_visited_at(visited_at);
    }

    /// Moves `last_visited_at` to `time` unless it already is later.
    pub fn update_last_visited_at(&mut self, time: DateTime<Utc>) {
        self.last_visited_at = Some(self.last_visited_at.map_or(time, |t| t.max(time)));
    }

    pub fn id(&self) -> StatisticsId {
        self.id
    }

    pub fn short_url_id(&self) -> ShortUrlId {
        self.short_url_id
    }

    pub fn visit_count(&self) -> u64 {
        self.visit_count
    }

    pub fn last_visited_at(&self) -> Option<DateTime<Utc>> {
        self.last_visited_at
    }
}
