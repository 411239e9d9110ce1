//! Fan-out of queued domain events to registered handlers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::event_bus::EventHandler;
use crate::domain::events::{DomainEvent, EventKind};

/// Tuning knobs for [`EventDispatcher`].
#[derive(Debug, Clone, Copy)]
pub struct DispatcherSettings {
    /// Events handled at the same time.
    pub concurrency: usize,
    /// Retries per handler after the first failed attempt.
    pub max_retries: usize,
    /// Backoff base in milliseconds; retry `n` waits about `base^n` ms.
    pub base_delay_ms: u64,
    /// Upper bound for a single backoff delay.
    pub max_delay: Duration,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_retries: 3,
            base_delay_ms: 10,
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Routes each [`DomainEvent`] to every handler subscribed to its kind.
///
/// Handlers for one event run one after another; distinct events run
/// concurrently up to `concurrency`, so there is no ordering guarantee
/// between two visits of the same short URL. A failing handler is retried
/// with jittered exponential backoff. Once retries are exhausted the event is
/// dropped for that handler and logged.
pub struct EventDispatcher {
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
    settings: DispatcherSettings,
}

impl EventDispatcher {
    pub fn new(settings: DispatcherSettings) -> Self {
        Self {
            handlers: HashMap::new(),
            settings: DispatcherSettings {
                concurrency: settings.concurrency.max(1),
                ..settings
            },
        }
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> &mut Self {
        info!(event = kind.as_str(), handler = handler.name(), "Handler subscribed");
        self.handlers.entry(kind).or_default().push(handler);
        self
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Consumes events until every sender is dropped, then waits for the
    /// events already in flight.
    pub async fn run(self, receiver: mpsc::Receiver<DomainEvent>) {
        self.run_until(receiver, std::future::pending()).await
    }

    /// Like [`Self::run`], but also stops accepting events once `shutdown`
    /// completes. Events queued before that point are still handled.
    pub async fn run_until<F>(self, mut receiver: mpsc::Receiver<DomainEvent>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let handlers = Arc::new(self.handlers);
        let settings = self.settings;
        let permits = Arc::new(Semaphore::new(settings.concurrency));
        let mut in_flight = JoinSet::new();
        let mut closing = false;
        tokio::pin!(shutdown);

        info!(concurrency = settings.concurrency, "Event dispatcher started");

        loop {
            let event = tokio::select! {
                _ = &mut shutdown, if !closing => {
                    info!(queued = receiver.len(), "Shutdown requested, draining event queue");
                    receiver.close();
                    closing = true;
                    continue;
                }
                event = receiver.recv() => event,
            };
            let Some(event) = event else {
                break;
            };

            let Ok(permit) = permits.clone().acquire_owned().await else {
                break;
            };

            // reap finished tasks so the set stays bounded
            while in_flight.try_join_next().is_some() {}

            let handlers = Arc::clone(&handlers);
            in_flight.spawn(async move {
                let _permit = permit;
                let Some(subscribed) = handlers.get(&event.kind()) else {
                    debug!(event = event.kind().as_str(), "No handler subscribed");
                    return;
                };
                for handler in subscribed {
                    deliver(handler.as_ref(), &event, &settings).await;
                }
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Event task panicked");
            }
        }

        info!("Event dispatcher stopped");
    }
}

async fn deliver(handler: &dyn EventHandler, event: &DomainEvent, settings: &DispatcherSettings) {
    let kind = event.kind().as_str();
    let strategy = ExponentialBackoff::from_millis(settings.base_delay_ms)
        .max_delay(settings.max_delay)
        .map(jitter)
        .take(settings.max_retries);

    let result = Retry::spawn(strategy, || async {
        handler.handle(event).await.inspect_err(|e| {
            warn!(event = kind, handler = handler.name(), error = %e, "Handler attempt failed");
        })
    })
    .await;

    match result {
        Ok(()) => {
            metrics::counter!("events_handled_total", "event" => kind, "handler" => handler.name())
                .increment(1);
        }
        Err(e) => {
            error!(
                event = kind,
                handler = handler.name(),
                short_url_id = %event.short_url_id(),
                error = %e,
                "Event dropped after retries"
            );
            metrics::counter!("events_failed_total", "event" => kind, "handler" => handler.name())
                .increment(1);
        }
    }
}
