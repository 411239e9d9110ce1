//! Use-case services consumed by the outer adapters.

pub mod short_url_service;
pub mod stats_service;

pub use short_url_service::ShortUrlService;
pub use stats_service::StatsService;
