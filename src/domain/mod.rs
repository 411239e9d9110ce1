//! Domain layer containing value types, aggregates, events and repository
//! contracts.
//!
//! The domain layer has no dependencies on infrastructure: repository and
//! event-bus traits define the contracts implemented in
//! [`crate::infrastructure`].
//!
//! # Architecture
//!
//! - [`value_objects`] - [`value_objects::OriginalUrl`] and [`value_objects::ShortCode`]
//! - [`specification`] - The shared URL format rule
//! - [`entities`] - `ShortUrl`, `Statistics` and `VisitLog` aggregates
//! - [`events`] - Visit and deletion events
//! - [`event_bus`] - Publishing and handling contracts
//! - [`repositories`] - Durable store contracts
//!
//! # Lifecycle Flow
//!
//! 1. A redirect resolves a live `ShortUrl` and publishes [`events::UrlVisitedEvent`]
//! 2. Handlers increment `Statistics` and append a `VisitLog`, detached from the request
//! 3. Deleting soft-deletes the `ShortUrl` and publishes [`events::ShortUrlDeletedEvent`]
//! 4. A handler hard-deletes the `Statistics`; `VisitLog` rows stay

pub mod entities;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod repositories;
pub mod specification;
pub mod value_objects;

pub use error::DomainError;
