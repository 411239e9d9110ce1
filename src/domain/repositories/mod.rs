//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the durable store. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - Short URL lookups and writes
//! - [`StatisticsRepository`] - Visit counters with atomic increment and hard delete
//! - [`VisitLogRepository`] - Append-only visit history

pub mod short_url_repository;
pub mod statistics_repository;
pub mod visit_log_repository;

pub use short_url_repository::ShortUrlRepository;
pub use statistics_repository::StatisticsRepository;
pub use visit_log_repository::VisitLogRepository;

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use statistics_repository::MockStatisticsRepository;
#[cfg(test)]
pub use visit_log_repository::MockVisitLogRepository;
