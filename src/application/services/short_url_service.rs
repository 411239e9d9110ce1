//! Short URL creation, resolution and deletion.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{ShortUrl, Statistics, StatisticsId};
use crate::domain::event_bus::EventBus;
use crate::domain::events::{ShortUrlDeletedEvent, UrlVisitedEvent};
use crate::domain::repositories::ShortUrlRepository;
use crate::domain::value_objects::{OriginalUrl, ShortCode};
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Drives the ShortUrl lifecycle.
///
/// `R` is normally a [`crate::application::CacheAsideStore`], so resolution
/// reads the cache first while uniqueness checks always reach the durable
/// store. A short URL and its Statistics are created together by the store;
/// later side effects on Statistics and on VisitLog are left to event
/// handlers.
pub struct ShortUrlService<R: ShortUrlRepository> {
    short_urls: Arc<R>,
    events: Arc<dyn EventBus>,
    generator: CodeGenerator,
}

impl<R: ShortUrlRepository> ShortUrlService<R> {
    pub fn new(short_urls: Arc<R>, events: Arc<dyn EventBus>) -> Self {
        Self {
            short_urls,
            events,
            generator: CodeGenerator::new(),
        }
    }

    /// Creates a short URL for `raw_url`, or returns the live one that
    /// already exists for it.
    ///
    /// # Code Generation
    ///
    /// The first candidate is derived from the URL alone. On a collision the
    /// candidate is regenerated with the attempt number as salt. A collision
    /// is either an existing row with that code (deleted rows included) or a
    /// `Conflict` from the store's unique constraint when a concurrent writer
    /// got there first. If that writer stored the same URL, its row is
    /// returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is malformed.
    /// Returns [`AppError::Internal`] once every candidate collided, or on
    /// store errors.
    pub async fn shorten(&self, raw_url: &str) -> Result<ShortUrl, AppError> {
        let original_url = OriginalUrl::parse(raw_url)?;

        if let Some(existing) = self.live_for(&original_url).await? {
            return Ok(existing);
        }

        let mut attempt = 0;
        loop {
            let code = if attempt == 0 {
                self.generator.generate(&original_url)
            } else {
                self.generator.regenerate(&original_url, attempt)?
            };

            if self.short_urls.exists_by_short_code(&code).await? {
                if let Some(existing) = self.live_for(&original_url).await? {
                    return Ok(existing);
                }
                record_collision(&code, attempt);
                attempt += 1;
                continue;
            }

            let statistics_id = StatisticsId::new();
            let short_url = ShortUrl::create(original_url.clone(), code, statistics_id);
            let statistics = Statistics::create_with_id(statistics_id, short_url.id());

            match self
                .short_urls
                .create_with_statistics(&short_url, &statistics)
                .await
            {
                Ok(saved) => {
                    info!(
                        short_code = %saved.short_code(),
                        short_url_id = %saved.id(),
                        attempt,
                        "Short URL created"
                    );
                    return Ok(saved);
                }
                Err(e) if e.is_conflict() => {
                    if let Some(existing) = self.live_for(&original_url).await? {
                        return Ok(existing);
                    }
                    record_collision(short_url.short_code(), attempt);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolves `code` for a redirect and publishes a visit.
    ///
    /// The visit is queued, not applied: the caller never waits for
    /// statistics or visit-log writes. A failure to queue is logged and does
    /// not fail the redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is malformed, unknown or
    /// soft-deleted.
    pub async fn resolve(
        &self,
        code: &str,
        ip_address: Option<String>,
        user_agent: Option<&str>,
    ) -> Result<ShortUrl, AppError> {
        let short_url = self.find_live(code).await?;

        let event = UrlVisitedEvent::new(
            short_url.id(),
            short_url.statistics_id(),
            ip_address,
            user_agent,
        );
        if let Err(e) = self.events.publish(event.into()).await {
            warn!(short_code = %short_url.short_code(), error = %e, "Visit not recorded");
        }

        Ok(short_url)
    }

    /// Looks up a live short URL without recording a visit.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub async fn get(&self, code: &str) -> Result<ShortUrl, AppError> {
        self.find_live(code).await
    }

    /// Soft-deletes the short URL behind `code` and schedules removal of its
    /// statistics.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or already
    /// deleted, including when a concurrent delete stored its deletion first.
    /// Returns [`AppError::Internal`] if the deletion was stored but the
    /// cleanup event could not be queued.
    pub async fn delete(&self, code: &str) -> Result<ShortUrl, AppError> {
        let mut short_url = self.find_live(code).await?;

        short_url.soft_delete()?;
        let deleted = match self.short_urls.save(&short_url).await {
            Ok(deleted) => deleted,
            Err(e) if e.is_conflict() => {
                debug!(short_code = %short_url.short_code(), "Short URL deleted concurrently");
                return Err(not_found(code));
            }
            Err(e) => return Err(e),
        };

        self.events
            .publish(ShortUrlDeletedEvent::new(deleted.id(), deleted.statistics_id()).into())
            .await?;

        info!(short_code = %deleted.short_code(), short_url_id = %deleted.id(), "Short URL deleted");
        Ok(deleted)
    }

    /// Live short URL already stored for `url`. Checked again after every
    /// collision, since the colliding row may be a concurrent request for the
    /// same URL.
    async fn live_for(&self, url: &OriginalUrl) -> Result<Option<ShortUrl>, AppError> {
        let existing = self.short_urls.find_by_original_url(url).await?;
        if let Some(short_url) = &existing {
            debug!(short_code = %short_url.short_code(), "Reusing live short URL");
        }
        Ok(existing)
    }

    async fn find_live(&self, code: &str) -> Result<ShortUrl, AppError> {
        let Ok(short_code) = ShortCode::parse(code) else {
            return Err(not_found(code));
        };

        self.short_urls
            .find_by_short_code(&short_code)
            .await?
            .filter(|s| !s.is_deleted())
            .ok_or_else(|| not_found(code))
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "code": code }))
}

fn record_collision(code: &ShortCode, attempt: u32) {
    warn!(short_code = %code, attempt, "Short code collision");
    metrics::counter!("code_collisions_total").increment(1);
}
