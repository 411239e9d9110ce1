//! Event delivery contracts.

use async_trait::async_trait;

use crate::domain::events::DomainEvent;
use crate::error::AppError;

/// Publishes domain events for asynchronous handling.
///
/// Delivery is at-least-once; handlers must tolerate re-delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Hands the event to the delivery mechanism. Returns once the event is
    /// queued, not once it has been handled.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the bus is shut down.
    async fn publish(&self, event: DomainEvent) -> Result<(), AppError>;
}

/// Reacts to one or more kinds of [`DomainEvent`].
///
/// Handlers run detached from the request that produced the event, possibly
/// concurrently with each other and out of order. A handler must treat a
/// missing target row as a no-op. Returning an error asks the delivery
/// mechanism to retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent) -> Result<(), AppError>;
}
