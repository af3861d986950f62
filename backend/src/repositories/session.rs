//! Login session repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Session record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: i64,
    pub remember: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Session repository for database operations
pub struct SessionRepository;

impl SessionRepository {
    pub async fn create(
        pool: &PgPool,
        id: &str,
        user_id: i64,
        remember: bool,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO sessions (id, user_id, remember, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, remember, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(remember)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Find a session that has not expired at `now`
    pub async fn find_active(
        pool: &PgPool,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, remember, expires_at, created_at
            FROM sessions
            WHERE id = $1 AND expires_at > $2
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop a user's sessions that expired before `now`
    pub async fn purge_expired(pool: &PgPool, user_id: i64, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= $2")
            .bind(user_id)
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
