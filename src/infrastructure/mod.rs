//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the contracts declared in the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Short URL caches (Redis, in-process and no-op)
//! - [`events`] - Channel event bus and handler dispatcher
//! - [`persistence`] - PostgreSQL and in-memory repositories

pub mod cache;
pub mod events;
pub mod persistence;
