mod common;

use std::sync::Arc;

use url_shortener_core::AppError;
use url_shortener_core::domain::repositories::{ShortUrlRepository, StatisticsRepository};
use url_shortener_core::domain::value_objects::ShortCode;
use url_shortener_core::infrastructure::cache::CacheService;

const URL: &str = "https://example.com/path";

#[tokio::test]
async fn test_create_resolve_and_count_visits() {
    let mut h = common::harness();

    let created = h.core.short_urls.shorten(URL).await.unwrap();
    assert_eq!(created.short_code().as_str(), "0VEGkkJ");

    for agent in ["Mozilla/5.0", "curl/8.0", "Wget/1.21"] {
        let resolved = h
            .core
            .short_urls
            .resolve("0VEGkkJ", Some("203.0.113.7".to_string()), Some(agent))
            .await
            .unwrap();
        assert_eq!(resolved.original_url().as_str(), URL);
    }

    h.core.shutdown().await;

    let stats = h.core.stats.statistics_for(created.id()).await.unwrap();
    assert_eq!(stats.id(), created.statistics_id());
    assert_eq!(stats.visit_count(), 3);
    assert!(stats.last_visited_at().is_some());

    let history = h.core.stats.visit_history(created.id()).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(
        history
            .iter()
            .all(|log| log.ip_address() == Some("203.0.113.7"))
    );
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].visited_at() >= pair[1].visited_at())
    );
}

#[tokio::test]
async fn test_delete_removes_statistics_and_keeps_visit_logs() {
    let mut h = common::harness();

    let created = h.core.short_urls.shorten(URL).await.unwrap();
    let code = created.short_code().as_str().to_string();
    h.core
        .short_urls
        .resolve(&code, Some("198.51.100.1".to_string()), Some("Mozilla/5.0"))
        .await
        .unwrap();
    h.core
        .short_urls
        .resolve(&code, Some("198.51.100.2".to_string()), None)
        .await
        .unwrap();

    common::wait_for_visit_logs(&h, created.id(), 2).await;
    let before = h.core.stats.visit_history(created.id()).await.unwrap();
    assert_eq!(before.len(), 2);

    let deleted = h.core.short_urls.delete(&code).await.unwrap();
    assert!(deleted.is_deleted());

    h.core.shutdown().await;

    let after = h.core.stats.visit_history(created.id()).await.unwrap();
    assert_eq!(after, before);

    assert!(matches!(
        h.core.stats.statistics_for(created.id()).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(
        h.statistics
            .find_by_id(created.statistics_id())
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(h.core.stats.visit_count(created.id()).await.unwrap(), 2);

    // soft delete keeps the row, but it never resolves again
    let stored = h
        .short_urls
        .find_by_short_code(created.short_code())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_deleted());
    assert!(!h.cache.contains(&code));
    assert!(matches!(
        h.core.short_urls.resolve(&code, None, None).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        h.core.short_urls.delete(&code).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_deletes_succeed_once() {
    let mut h = common::harness();
    let created = h.core.short_urls.shorten(URL).await.unwrap();
    let first_deleted_at = {
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&h.core.short_urls);
            tasks.push(tokio::spawn(async move { service.delete("0VEGkkJ").await }));
        }

        let mut deleted = Vec::new();
        for task in tasks {
            match task.await.unwrap() {
                Ok(short_url) => deleted.push(short_url),
                Err(e) => assert!(matches!(e, AppError::NotFound { .. })),
            }
        }
        assert_eq!(deleted.len(), 1);
        deleted[0].deleted_at()
    };

    h.core.shutdown().await;

    let stored = h.short_urls.find_by_id(created.id()).await.unwrap().unwrap();
    assert_eq!(stored.deleted_at(), first_deleted_at);
    assert!(h.statistics.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_visits_are_all_counted() {
    const VISITS: usize = 64;
    let mut h = common::harness();

    let created = h.core.short_urls.shorten(URL).await.unwrap();

    let mut tasks = Vec::with_capacity(VISITS);
    for i in 0..VISITS {
        let service = Arc::clone(&h.core.short_urls);
        tasks.push(tokio::spawn(async move {
            service
                .resolve("0VEGkkJ", Some(format!("10.0.0.{i}")), None)
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    h.core.shutdown().await;

    let stats = h.core.stats.statistics_for(created.id()).await.unwrap();
    assert_eq!(stats.visit_count(), VISITS as u64);
    assert_eq!(
        h.core.stats.visit_count(created.id()).await.unwrap(),
        VISITS as u64
    );
}

#[tokio::test]
async fn test_shorten_same_url_returns_existing() {
    let mut h = common::harness();

    let first = h.core.short_urls.shorten(URL).await.unwrap();
    let second = h.core.short_urls.shorten(URL).await.unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(h.short_urls.len().await, 1);
    assert_eq!(h.statistics.len().await, 1);

    h.core.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_shorten_of_one_url_creates_one_row() {
    let mut h = common::harness();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&h.core.short_urls);
        tasks.push(tokio::spawn(async move { service.shorten(URL).await }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap().id());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 1);
    assert_eq!(h.short_urls.len().await, 1);
    assert_eq!(h.statistics.len().await, 1);

    h.core.shutdown().await;
}

#[tokio::test]
async fn test_reshorten_after_delete_gets_new_code() {
    let mut h = common::harness();

    let original = h.core.short_urls.shorten(URL).await.unwrap();
    h.core.short_urls.delete("0VEGkkJ").await.unwrap();

    let recreated = h.core.short_urls.shorten(URL).await.unwrap();

    assert_ne!(recreated.id(), original.id());
    assert_eq!(recreated.short_code().as_str(), "ccU9tgp");
    assert_ne!(recreated.statistics_id(), original.statistics_id());

    h.core.shutdown().await;
}

#[tokio::test]
async fn test_collision_with_other_url_regenerates() {
    let mut h = common::harness();
    common::occupy_code(&h.short_urls, "https://other.example.com", "0VEGkkJ").await;

    let created = h.core.short_urls.shorten(URL).await.unwrap();

    assert_eq!(created.short_code().as_str(), "ccU9tgp");
    assert_eq!(created.original_url().as_str(), URL);

    h.core.shutdown().await;
}

#[tokio::test]
async fn test_exhausted_candidates_fail_creation() {
    let mut h = common::harness();
    for (i, code) in ["0VEGkkJ", "ccU9tgp", "OfXa62w", "eTYMoI1"].into_iter().enumerate() {
        common::occupy_code(&h.short_urls, &format!("https://other{i}.example.com"), code).await;
    }

    let result = h.core.short_urls.shorten(URL).await;

    assert!(matches!(result, Err(AppError::Internal { .. })));
    assert_eq!(h.short_urls.len().await, 4);
    assert!(h.statistics.is_empty().await);

    h.core.shutdown().await;
}

#[tokio::test]
async fn test_resolve_is_served_from_cache() {
    let mut h = common::harness();

    h.core.short_urls.shorten(URL).await.unwrap();

    assert!(h.cache.contains("0VEGkkJ"));
    let cached = h
        .core
        .cache
        .get("0VEGkkJ")
        .await
        .unwrap()
        .expect("entry written on create");
    assert_eq!(cached.short_code(), &ShortCode::parse("0VEGkkJ").unwrap());

    h.core.shutdown().await;
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let mut h = common::harness();

    for raw in ["", "ftp://example.com", "https://localhost", "not a url"] {
        assert!(
            matches!(
                h.core.short_urls.shorten(raw).await,
                Err(AppError::Validation { .. })
            ),
            "{raw:?} should be rejected"
        );
    }
    assert!(h.short_urls.is_empty().await);

    h.core.shutdown().await;
}
