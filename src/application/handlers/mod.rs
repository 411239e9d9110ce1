//! Event handlers that apply the cascading side effects of the ShortUrl
//! lifecycle.
//!
//! | Event | Handler | Effect |
//! |---|---|---|
//! | `UrlVisited` | [`VisitCountHandler`] | Atomic increment of the Statistics row |
//! | `UrlVisited` | [`VisitLogRecorder`] | Appends a VisitLog |
//! | `ShortUrlDeleted` | [`StatisticsCleanupHandler`] | Hard-deletes the Statistics row |
//!
//! Every handler ignores event kinds it does not own and treats a missing
//! target row as already handled.

mod statistics_cleanup;
mod visit_count;
mod visit_log_recorder;

pub use statistics_cleanup::StatisticsCleanupHandler;
pub use visit_count::VisitCountHandler;
pub use visit_log_recorder::VisitLogRecorder;
