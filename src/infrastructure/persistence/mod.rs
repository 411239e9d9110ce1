//! Durable store implementations of the domain repository traits.
//!
//! # Repositories
//!
//! - [`PgShortUrlRepository`] - Short URL storage with a unique short code constraint
//! - [`PgStatisticsRepository`] - Visit counters with atomic increment
//! - [`PgVisitLogRepository`] - Append-only visit history
//! - [`memory`] - In-process equivalents of all three

pub mod memory;
pub mod pg_short_url_repository;
pub mod pg_statistics_repository;
pub mod pg_visit_log_repository;

pub use memory::{InMemoryShortUrlRepository, InMemoryStatisticsRepository, InMemoryVisitLogRepository};
pub use pg_short_url_repository::PgShortUrlRepository;
pub use pg_statistics_repository::PgStatisticsRepository;
pub use pg_visit_log_repository::PgVisitLogRepository;
