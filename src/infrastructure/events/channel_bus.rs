//! Channel-backed event bus.

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::event_bus::EventBus;
use crate::domain::events::DomainEvent;
use crate::error::AppError;

/// [`EventBus`] that queues events on a bounded `mpsc` channel.
///
/// Publishing only waits for queue space, never for handlers, so the caller
/// is decoupled from statistics and visit-log persistence. The receiving end
/// is drained by [`super::EventDispatcher::run`].
#[derive(Clone)]
pub struct ChannelEventBus {
    sender: mpsc::Sender<DomainEvent>,
}

impl ChannelEventBus {
    /// Creates a bus and the receiver to hand to the dispatcher.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DomainEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Events currently waiting for the dispatcher.
    pub fn queued(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

#[async_trait]
impl EventBus for ChannelEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), AppError> {
        let kind = event.kind().as_str();

        self.sender.send(event).await.map_err(|_| {
            AppError::internal("Event bus is closed", json!({ "event": kind }))
        })?;

        debug!(event = kind, "Event published");
        metrics::counter!("events_published_total", "event" => kind).increment(1);
        Ok(())
    }
}
