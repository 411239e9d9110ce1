#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use url_shortener_core::bootstrap::{self, CoreSettings, InMemoryCore};
use url_shortener_core::domain::entities::{ShortUrl, ShortUrlId, StatisticsId};
use url_shortener_core::domain::repositories::ShortUrlRepository;
use url_shortener_core::domain::value_objects::{OriginalUrl, ShortCode};
use url_shortener_core::infrastructure::cache::MemoryCache;
use url_shortener_core::infrastructure::events::DispatcherSettings;
use url_shortener_core::infrastructure::persistence::{
    InMemoryShortUrlRepository, InMemoryStatisticsRepository, InMemoryVisitLogRepository,
};

/// In-memory core plus handles on the stores and cache behind it.
pub struct Harness {
    pub core: InMemoryCore,
    pub short_urls: InMemoryShortUrlRepository,
    pub statistics: InMemoryStatisticsRepository,
    pub visit_logs: InMemoryVisitLogRepository,
    pub cache: Arc<MemoryCache>,
}

pub fn settings() -> CoreSettings {
    CoreSettings {
        cache_ttl_seconds: 60,
        cache_sweep_interval: Duration::from_secs(60),
        event_queue_capacity: 1024,
        dispatcher: DispatcherSettings {
            concurrency: 8,
            max_retries: 2,
            base_delay_ms: 1,
            max_delay: Duration::from_millis(10),
        },
    }
}

pub fn harness() -> Harness {
    let statistics = InMemoryStatisticsRepository::new();
    let short_urls = InMemoryShortUrlRepository::new(&statistics);
    let visit_logs = InMemoryVisitLogRepository::new();
    let cache = Arc::new(MemoryCache::new(60));

    let core = bootstrap::assemble(
        short_urls.clone(),
        statistics.clone(),
        visit_logs.clone(),
        cache.clone(),
        settings(),
    );

    Harness {
        core,
        short_urls,
        statistics,
        visit_logs,
        cache,
    }
}

/// Polls until `expected` visits are logged for `short_url_id`.
pub async fn wait_for_visit_logs(h: &Harness, short_url_id: ShortUrlId, expected: u64) {
    for _ in 0..200 {
        if h.core.stats.visit_count(short_url_id).await.unwrap() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("visit logs for {short_url_id} never reached {expected}");
}

/// Stores a short URL directly, bypassing code generation.
pub async fn occupy_code(repo: &InMemoryShortUrlRepository, url: &str, code: &str) -> ShortUrl {
    repo.save(&short_url(url, code)).await.unwrap()
}

pub fn short_url(url: &str, code: &str) -> ShortUrl {
    ShortUrl::create(
        OriginalUrl::parse(url).unwrap(),
        ShortCode::parse(code).unwrap(),
        StatisticsId::new(),
    )
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
