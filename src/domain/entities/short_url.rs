//! ShortUrl aggregate root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ShortUrlId, StatisticsId};
use crate::domain::error::DomainError;
use crate::domain::value_objects::{OriginalUrl, ShortCode};

/// Lifecycle state of a [`ShortUrl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Deleted,
}

/// A mapping from a short code to an original URL.
///
/// Created once through [`ShortUrl::create`] and mutated only by
/// [`ShortUrl::soft_delete`]. A deleted short URL never resolves for
/// redirects and is never physically removed. Its `Statistics` is referenced
/// by id only; deleting the statistics is driven by a domain event, not by
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    id: ShortUrlId,
    original_url: OriginalUrl,
    short_code: ShortCode,
    statistics_id: StatisticsId,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// Builds a new, active short URL. Has no side effects: publishing
    /// events and persisting are up to the caller.
    pub fn create(
        original_url: OriginalUrl,
        short_code: ShortCode,
        statistics_id: StatisticsId,
    ) -> Self {
        Self {
            id: ShortUrlId::new(),
            original_url,
            short_code,
            statistics_id,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Rebuilds a short URL from stored state.
    pub fn restore(
        id: ShortUrlId,
        original_url: OriginalUrl,
        short_code: ShortCode,
        statistics_id: StatisticsId,
        created_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            original_url,
            short_code,
            statistics_id,
            created_at,
            deleted_at,
        }
    }

    /// Marks the short URL as deleted.
    ///
    /// The caller publishes the matching `ShortUrlDeletedEvent` afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::AlreadyDeleted`] if the short URL was already
    /// deleted; deleting twice is a lifecycle bug, not a no-op.
    pub fn soft_delete(&mut self) -> Result<(), DomainError> {
        if self.is_deleted() {
            return Err(DomainError::AlreadyDeleted { id: self.id });
        }
        self.deleted_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn state(&self) -> LifecycleState {
        if self.is_deleted() {
            LifecycleState::Deleted
        } else {
            LifecycleState::Active
        }
    }

    pub fn id(&self) -> ShortUrlId {
        self.id
    }

    pub fn original_url(&self) -> &OriginalUrl {
        &self.original_url
    }

    pub fn short_code(&self) -> &ShortCode {
        &self.short_code
    }

    pub fn statistics_id(&self) -> StatisticsId {
        self.statistics_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ShortUrl {
        ShortUrl::create(
            OriginalUrl::parse("https://example.com/path").unwrap(),
            ShortCode::parse("abc1234").unwrap(),
            StatisticsId::new(),
        )
    }

    #[test]
    fn test_create_is_active() {
        let before = Utc::now();
        let short_url = sample();

        assert!(!short_url.is_deleted());
        assert_eq!(short_url.state(), LifecycleState::Active);
        assert!(short_url.deleted_at().is_none());
        assert!(short_url.created_at() >= before);
        assert_eq!(short_url.short_code().as_str(), "abc1234");
    }

    #[test]
    fn test_soft_delete_marks_deleted() {
        let mut short_url = sample();

        short_url.soft_delete().unwrap();

        assert!(short_url.is_deleted());
        assert_eq!(short_url.state(), LifecycleState::Deleted);
        assert!(short_url.deleted_at().is_some());
    }

    #[test]
    fn test_second_soft_delete_fails() {
        let mut short_url = sample();
        short_url.soft_delete().unwrap();
        let first_deleted_at = short_url.deleted_at();

        let result = short_url.soft_delete();

        assert_eq!(
            result,
            Err(DomainError::AlreadyDeleted { id: short_url.id() })
        );
        assert_eq!(short_url.deleted_at(), first_deleted_at);
    }

    #[test]
    fn test_snapshot_round_trip_keeps_state() {
        let mut short_url = sample();
        short_url.soft_delete().unwrap();

        let json = serde_json::to_string(&short_url).unwrap();
        let restored: ShortUrl = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, short_url);
        assert!(restored.is_deleted());
    }

    #[test]
    fn test_snapshot_with_invalid_code_is_rejected() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["short_code"] = serde_json::json!("no!");

        assert!(serde_json::from_value::<ShortUrl>(value).is_err());
    }
}
