//! Startup wiring.
//!
//! Connects the durable store and the cache, starts the event dispatcher with
//! the lifecycle handlers subscribed, and hands back a [`Core`] exposing the
//! services.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::CacheAsideStore;
use crate::application::handlers::{StatisticsCleanupHandler, VisitCountHandler, VisitLogRecorder};
use crate::application::services::{ShortUrlService, StatsService};
use crate::config::Config;
use crate::domain::events::EventKind;
use crate::domain::repositories::{ShortUrlRepository, StatisticsRepository, VisitLogRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::events::{ChannelEventBus, DispatcherSettings, EventDispatcher};
use crate::infrastructure::persistence::{
    InMemoryShortUrlRepository, InMemoryStatisticsRepository, InMemoryVisitLogRepository,
    PgShortUrlRepository, PgStatisticsRepository, PgVisitLogRepository,
};

/// Runtime knobs that do not depend on the chosen backends.
#[derive(Debug, Clone, Copy)]
pub struct CoreSettings {
    pub cache_ttl_seconds: u64,
    /// How often the in-process cache drops expired entries.
    pub cache_sweep_interval: Duration,
    pub event_queue_capacity: usize,
    pub dispatcher: DispatcherSettings,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 3600,
            cache_sweep_interval: Duration::from_secs(60),
            event_queue_capacity: 10_000,
            dispatcher: DispatcherSettings::default(),
        }
    }
}

impl From<&Config> for CoreSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl_seconds: config.cache_ttl_seconds,
            cache_sweep_interval: CoreSettings::default().cache_sweep_interval,
            event_queue_capacity: config.event_queue_capacity,
            dispatcher: DispatcherSettings {
                concurrency: config.event_worker_concurrency,
                max_retries: config.event_max_retries,
                ..DispatcherSettings::default()
            },
        }
    }
}

/// Running services plus the background dispatcher feeding the lifecycle
/// handlers.
pub struct Core<R, S, V>
where
    R: ShortUrlRepository,
    S: StatisticsRepository,
    V: VisitLogRepository,
{
    pub short_urls: Arc<ShortUrlService<CacheAsideStore<R>>>,
    pub stats: Arc<StatsService<S, V>>,
    pub cache: Arc<dyn CacheService>,
    shutdown: Option<oneshot::Sender<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

pub type PgCore = Core<PgShortUrlRepository, PgStatisticsRepository, PgVisitLogRepository>;

pub type InMemoryCore =
    Core<InMemoryShortUrlRepository, InMemoryStatisticsRepository, InMemoryVisitLogRepository>;

impl<R, S, V> Core<R, S, V>
where
    R: ShortUrlRepository,
    S: StatisticsRepository,
    V: VisitLogRepository,
{
    /// Stops accepting events and waits until every queued event has been
    /// handled. Calling it again is a no-op.
    ///
    /// Visits resolved after this point are not recorded.
    pub async fn shutdown(&mut self) {
        if let Some(stop) = self.shutdown.take() {
            let _ = stop.send(());
        }

        if let Some(dispatcher) = self.dispatcher.take()
            && let Err(e) = dispatcher.await
        {
            error!(error = %e, "Event dispatcher task failed");
        }
    }
}

/// Wires services, handlers and the dispatcher over the given stores.
///
/// Must be called from within a tokio runtime; the dispatcher is spawned on
/// it.
pub fn assemble<R, S, V>(
    short_urls: R,
    statistics: S,
    visit_logs: V,
    cache: Arc<dyn CacheService>,
    settings: CoreSettings,
) -> Core<R, S, V>
where
    R: ShortUrlRepository + 'static,
    S: StatisticsRepository + 'static,
    V: VisitLogRepository + 'static,
{
    let statistics = Arc::new(statistics);
    let visit_logs = Arc::new(visit_logs);
    let store = Arc::new(
        CacheAsideStore::new(Arc::new(short_urls), Arc::clone(&cache))
            .with_ttl(settings.cache_ttl_seconds),
    );

    let (bus, receiver) = ChannelEventBus::new(settings.event_queue_capacity);

    let mut dispatcher = EventDispatcher::new(settings.dispatcher);
    dispatcher
        .subscribe(
            EventKind::UrlVisited,
            Arc::new(VisitCountHandler::new(Arc::clone(&statistics))),
        )
        .subscribe(
            EventKind::UrlVisited,
            Arc::new(VisitLogRecorder::new(Arc::clone(&visit_logs))),
        )
        .subscribe(
            EventKind::ShortUrlDeleted,
            Arc::new(StatisticsCleanupHandler::new(Arc::clone(&statistics))),
        );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(dispatcher.run_until(receiver, async move {
        let _ = stop_rx.await;
    }));
    info!("Event dispatcher spawned");

    let short_url_service = ShortUrlService::new(store, Arc::new(bus));
    let stats_service = StatsService::new(statistics, visit_logs);

    Core {
        short_urls: Arc::new(short_url_service),
        stats: Arc::new(stats_service),
        cache,
        shutdown: Some(stop_tx),
        dispatcher: Some(handle),
    }
}

/// Starts the core against PostgreSQL and the configured cache.
///
/// Migrations are applied before anything else. An unreachable Redis is not
/// fatal: the core runs without a cache and every lookup reads PostgreSQL.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn start(config: &Config) -> Result<PgCore> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.db_idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(config.db_max_lifetime)))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_connections = config.db_max_connections,
        "Connected to database"
    );

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Migrations applied");

    let settings = CoreSettings::from(config);
    let cache = select_cache(config, &settings).await;

    let pool = Arc::new(pool);
    Ok(assemble(
        PgShortUrlRepository::new(Arc::clone(&pool)),
        PgStatisticsRepository::new(Arc::clone(&pool)),
        PgVisitLogRepository::new(pool),
        cache,
        settings,
    ))
}

/// Starts the core on in-process stores with an in-process cache.
///
/// Must be called from within a tokio runtime.
pub fn start_in_memory(settings: CoreSettings) -> InMemoryCore {
    let statistics = InMemoryStatisticsRepository::new();
    assemble(
        InMemoryShortUrlRepository::new(&statistics),
        statistics,
        InMemoryVisitLogRepository::new(),
        memory_cache(&settings),
        settings,
    )
}

fn memory_cache(settings: &CoreSettings) -> Arc<dyn CacheService> {
    let cache = MemoryCache::new(settings.cache_ttl_seconds);
    cache.spawn_sweeper(settings.cache_sweep_interval);
    Arc::new(cache)
}

async fn select_cache(config: &Config, settings: &CoreSettings) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        info!("Cache enabled (in-process)");
        return memory_cache(settings);
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis, running without cache");
            Arc::new(NullCache::new())
        }
    }
}
