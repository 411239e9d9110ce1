//! # URL Shortener Core
//!
//! Short-code generation, cache-aside lookup and the event-driven lifecycle of
//! a short URL, its statistics and its visit history.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Aggregates, value types, events and the
//!   repository and event bus contracts
//! - **Application Layer** ([`application`]) - Services, the cache-aside
//!   store and the lifecycle event handlers
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL and in-memory
//!   stores, Redis and in-process caches, channel event delivery
//!
//! ## Lifecycle
//!
//! 1. [`ShortUrlService::shorten`] validates the URL, derives a code from its
//!    SHA-256 digest and stores the short URL with a fresh Statistics row.
//! 2. [`ShortUrlService::resolve`] reads through the cache and publishes a
//!    visit. Handlers bump the counter and append a visit log off the
//!    request path.
//! 3. [`ShortUrlService::delete`] soft-deletes the short URL and publishes a
//!    deletion; its Statistics row is then removed while visit logs stay.
//!
//! ## Quick Start
//!
//! ```no_run
//! use url_shortener_core::bootstrap::{self, CoreSettings};
//!
//! # async fn demo() -> Result<(), url_shortener_core::AppError> {
//! let mut core = bootstrap::start_in_memory(CoreSettings::default());
//!
//! let created = core.short_urls.shorten("https://example.com/some/long/path").await?;
//! let target = core.short_urls.resolve(created.short_code().as_str(), None, None).await?;
//! assert_eq!(target.original_url(), created.original_url());
//!
//! core.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! Production wiring reads [`config::Config`] from the environment and calls
//! [`bootstrap::start`].

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod telemetry;
pub mod utils;

pub use application::services::{ShortUrlService, StatsService};
pub use error::AppError;

/// Commonly used types for external consumers.
pub mod prelude {
    pub use crate::application::CacheAsideStore;
    pub use crate::application::services::{ShortUrlService, StatsService};
    pub use crate::bootstrap::{Core, CoreSettings, InMemoryCore, PgCore};
    pub use crate::domain::DomainError;
    pub use crate::domain::entities::{
        LifecycleState, ShortUrl, ShortUrlId, Statistics, StatisticsId, VisitLog, VisitLogId,
    };
    pub use crate::domain::events::{DomainEvent, ShortUrlDeletedEvent, UrlVisitedEvent};
    pub use crate::domain::value_objects::{OriginalUrl, ShortCode};
    pub use crate::error::AppError;
}
