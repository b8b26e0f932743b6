//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrl, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// PostgreSQL repository for origin URLs.
///
/// Uses bound parameters for every query. Schema lives in `migrations/`.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UrlRow {
    id: i64,
    origin_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(row.id, row.origin_url, row.created_at, row.updated_at)
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn find_by_origin_url(&self, origin_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, origin_url, created_at, updated_at
            FROM urls
            WHERE origin_url = $1
            "#,
        )
        .bind(origin_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn create(&self, new_url: NewUrl) -> Result<UrlRecord, AppError> {
        // The no-op update makes RETURNING yield the existing row when a
        // concurrent insert won the unique index.
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (origin_url)
            VALUES ($1)
            ON CONFLICT (origin_url) DO UPDATE SET origin_url = EXCLUDED.origin_url
            RETURNING id, origin_url, created_at, updated_at
            "#,
        )
        .bind(&new_url.origin_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, origin_url, created_at, updated_at
            FROM urls
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
