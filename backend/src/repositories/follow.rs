//! Follow graph repository

use anyhow::Result;
use sqlx::PgPool;

use super::user::UserRecord;

/// Follow edge repository
pub struct FollowRepository;

impl FollowRepository {
    /// Add an edge; an existing edge is left alone
    ///
    /// Returns whether a new edge was created.
    pub async fn follow(pool: &PgPool, follower_id: i64, followed_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO followers (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an edge if present
    pub async fn unfollow(pool: &PgPool, follower_id: i64, followed_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM followers WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `follower_id` follows `followed_id`
    pub async fn is_following(pool: &PgPool, follower_id: i64, followed_id: i64) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM followers WHERE follower_id = $1 AND followed_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Users following `user_id`
    pub async fn followers(pool: &PgPool, user_id: i64) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.first_name, u.last_name, u.username, u.email, u.password_hash,
                   u.about_me, u.last_seen, u.token, u.token_expiration, u.created_at
            FROM users u
            JOIN followers f ON f.follower_id = u.id
            WHERE f.followed_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Users `user_id` follows
    pub async fn followed(pool: &PgPool, user_id: i64) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.first_name, u.last_name, u.username, u.email, u.password_hash,
                   u.about_me, u.last_seen, u.token, u.token_expiration, u.created_at
            FROM users u
            JOIN followers f ON f.followed_id = u.id
            WHERE f.follower_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
