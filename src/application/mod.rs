//! Application layer: orchestration on top of the domain contracts.
//!
//! - [`CacheAsideStore`] - Cache-aside decorator for the short URL store
//! - [`services::ShortUrlService`] - Create, resolve and delete short URLs
//! - [`services::StatsService`] - Statistics and visit history reads
//! - [`handlers`] - Event handlers for visit counting, visit logging and
//!   statistics cleanup

mod cache_aside_store;
pub mod handlers;
pub mod services;

pub use cache_aside_store::CacheAsideStore;
