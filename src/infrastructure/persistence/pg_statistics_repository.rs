//! PostgreSQL implementation of the statistics repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ShortUrlId, Statistics, StatisticsId};
use crate::domain::repositories::StatisticsRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct StatisticsRow {
    id: Uuid,
    short_url_id: Uuid,
    visit_count: i64,
    last_visited_at: Option<DateTime<Utc>>,
}

impl TryFrom<StatisticsRow> for Statistics {
    type Error = AppError;

    fn try_from(row: StatisticsRow) -> Result<Self, Self::Error> {
        let visit_count = u64::try_from(row.visit_count).map_err(|_| {
            AppError::internal(
                "Stored visit count is negative",
                json!({ "id": row.id.to_string(), "visit_count": row.visit_count }),
            )
        })?;

        Ok(Statistics::restore(
            row.id.into(),
            row.short_url_id.into(),
            visit_count,
            row.last_visited_at,
        ))
    }
}

/// PostgreSQL repository for visit counters.
///
/// Increments are a single `UPDATE`, so concurrent visits are serialised by
/// the row lock instead of an application-level read-modify-write.
pub struct PgStatisticsRepository {
    pool: Arc<PgPool>,
}

impl PgStatisticsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatisticsRepository for PgStatisticsRepository {
    async fn find_by_id(&self, id: StatisticsId) -> Result<Option<Statistics>, AppError> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            "SELECT id, short_url_id, visit_count, last_visited_at FROM statistics WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Statistics::try_from).transpose()
    }

    async fn find_by_short_url_id(
        &self,
        short_url_id: ShortUrlId,
    ) -> Result<Option<Statistics>, AppError> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT id, short_url_id, visit_count, last_visited_at
            FROM statistics
            WHERE short_url_id = $1
            "#,
        )
        .bind(short_url_id.as_uuid())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Statistics::try_from).transpose()
    }

    async fn save(&self, statistics: &Statistics) -> Result<Statistics, AppError> {
        let visit_count = i64::try_from(statistics.visit_count()).map_err(|_| {
            AppError::bad_request(
                "Visit count out of range",
                json!({ "visit_count": statistics.visit_count() }),
            )
        })?;

        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            INSERT INTO statistics (id, short_url_id, visit_count, last_visited_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET visit_count = EXCLUDED.visit_count,
                    last_visited_at = EXCLUDED.last_visited_at
            RETURNING id, short_url_id, visit_count, last_visited_at
            "#,
        )
        .bind(statistics.id().as_uuid())
        .bind(statistics.short_url_id().as_uuid())
        .bind(visit_count)
        .bind(statistics.last_visited_at())
        .fetch_one(self.pool.as_ref())
        .await?;

        Statistics::try_from(row)
    }

    async fn increment(
        &self,
        id: StatisticsId,
        visited_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE statistics
            SET visit_count = visit_count + 1,
                last_visited_at = GREATEST(COALESCE(last_visited_at, $2), $2)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(visited_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: StatisticsId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM statistics WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
