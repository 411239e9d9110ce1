//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ShortUrl, ShortUrlId, Statistics};
use crate::domain::error::DomainError;
use crate::domain::repositories::ShortUrlRepository;
use crate::domain::value_objects::{OriginalUrl, ShortCode};
use crate::error::AppError;

const COLUMNS: &str = "id, original_url, short_code, statistics_id, created_at, deleted_at";

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: Uuid,
    original_url: String,
    short_code: String,
    statistics_id: Uuid,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ShortUrlRow> for ShortUrl {
    type Error = AppError;

    fn try_from(row: ShortUrlRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| {
            AppError::internal(
                "Stored short URL is invalid",
                json!({ "id": row.id.to_string(), "reason": reason }),
            )
        };

        let original_url = OriginalUrl::parse(row.original_url.as_str())
            .map_err(|e| corrupt(e.to_string()))?;
        let short_code =
            ShortCode::parse(row.short_code.as_str()).map_err(|e| corrupt(e.to_string()))?;

        Ok(ShortUrl::restore(
            row.id.into(),
            original_url,
            short_code,
            row.statistics_id.into(),
            row.created_at,
            row.deleted_at,
        ))
    }
}

/// PostgreSQL repository for short URL storage and retrieval.
///
/// Short code uniqueness is enforced by the `short_urls_short_code_key`
/// constraint; a violation surfaces as [`AppError::Conflict`]. Updates are
/// guarded by `deleted_at IS NULL`, so of two concurrent soft deletes only
/// one is stored.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            "SELECT {COLUMNS} FROM short_urls WHERE short_code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::try_from).transpose()
    }

    async fn find_by_original_url(
        &self,
        url: &OriginalUrl,
    ) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM short_urls
            WHERE original_url = $1 AND deleted_at IS NULL
            ORDER BY created_at
            LIMIT 1
            "#
        ))
        .bind(url.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::try_from).transpose()
    }

    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM short_urls WHERE short_code = $1)",
        )
        .bind(code.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: ShortUrlId) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            "SELECT {COLUMNS} FROM short_urls WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::try_from).transpose()
    }

    async fn create_with_statistics(
        &self,
        short_url: &ShortUrl,
        statistics: &Statistics,
    ) -> Result<ShortUrl, AppError> {
        let visit_count = i64::try_from(statistics.visit_count()).map_err(|_| {
            AppError::bad_request(
                "Visit count out of range",
                json!({ "visit_count": statistics.visit_count() }),
            )
        })?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            INSERT INTO short_urls ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(short_url.id().as_uuid())
        .bind(short_url.original_url().as_str())
        .bind(short_url.short_code().as_str())
        .bind(short_url.statistics_id().as_uuid())
        .bind(short_url.created_at())
        .bind(short_url.deleted_at())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO statistics (id, short_url_id, visit_count, last_visited_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(statistics.id().as_uuid())
        .bind(statistics.short_url_id().as_uuid())
        .bind(visit_count)
        .bind(statistics.last_visited_at())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        ShortUrl::try_from(row)
    }

    async fn save(&self, short_url: &ShortUrl) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            INSERT INTO short_urls ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET deleted_at = EXCLUDED.deleted_at
            WHERE short_urls.deleted_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(short_url.id().as_uuid())
        .bind(short_url.original_url().as_str())
        .bind(short_url.short_code().as_str())
        .bind(short_url.statistics_id().as_uuid())
        .bind(short_url.created_at())
        .bind(short_url.deleted_at())
        .fetch_optional(self.pool.as_ref())
        .await?;

        // No row back means the guarded update skipped an already deleted row.
        match row {
            Some(row) => ShortUrl::try_from(row),
            None => Err(DomainError::AlreadyDeleted { id: short_url.id() }.into()),
        }
    }
}
