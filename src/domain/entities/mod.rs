//! Aggregates of the short URL lifecycle.
//!
//! # Entity Types
//!
//! - [`ShortUrl`] - Aggregate root mapping an original URL to a short code
//! - [`Statistics`] - Visit counter owned 1:1 by a short URL
//! - [`VisitLog`] - Append-only record of a single visit, independent of the
//!   short URL's lifecycle
//!
//! Each aggregate has a typed identifier (see [`ids`]) so ids of different
//! aggregates cannot be mixed up at call sites.

pub mod ids;
pub mod short_url;
pub mod statistics;
pub mod visit_log;

pub use ids::{ShortUrlId, StatisticsId, VisitLogId};
pub use short_url::{LifecycleState, ShortUrl};
pub use statistics::Statistics;
pub use visit_log::VisitLog;
