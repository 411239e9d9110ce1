//! PostgreSQL implementation of the visit log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ShortUrlId, VisitLog};
use crate::domain::repositories::VisitLogRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct VisitLogRow {
    id: Uuid,
    short_url_id: Uuid,
    visited_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl From<VisitLogRow> for VisitLog {
    fn from(row: VisitLogRow) -> Self {
        VisitLog::restore(
            row.id.into(),
            row.short_url_id.into(),
            row.visited_at,
            row.ip_address,
            row.user_agent,
        )
    }
}

/// PostgreSQL repository for the append-only visit history.
pub struct PgVisitLogRepository {
    pool: Arc<PgPool>,
}

impl PgVisitLogRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitLogRepository for PgVisitLogRepository {
    async fn save(&self, visit_log: &VisitLog) -> Result<VisitLog, AppError> {
        sqlx::query(
            r#"
            INSERT INTO visit_logs (id, short_url_id, visited_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(visit_log.id().as_uuid())
        .bind(visit_log.short_url_id().as_uuid())
        .bind(visit_log.visited_at())
        .bind(visit_log.ip_address())
        .bind(visit_log.user_agent())
        .execute(self.pool.as_ref())
        .await?;

        Ok(visit_log.clone())
    }

    async fn find_by_short_url_id(
        &self,
        short_url_id: ShortUrlId,
    ) -> Result<Vec<VisitLog>, AppError> {
        let rows = sqlx::query_as::<_, VisitLogRow>(
            r#"
            SELECT id, short_url_id, visited_at, ip_address, user_agent
            FROM visit_logs
            WHERE short_url_id = $1
            ORDER BY visited_at DESC
            "#,
        )
        .bind(short_url_id.as_uuid())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(VisitLog::from).collect())
    }

    async fn count_by_short_url_id(&self, short_url_id: ShortUrlId) -> Result<u64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM visit_logs WHERE short_url_id = $1",
        )
        .bind(short_url_id.as_uuid())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count.max(0) as u64)
    }
}
