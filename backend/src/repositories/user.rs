//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub about_me: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub token: Option<String>,
    pub token_expiration: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts shown alongside a user
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct UserStats {
    pub course_count: i64,
    pub follower_count: i64,
    pub followed_count: i64,
}

/// Bearer token columns of a locked user row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenRow {
    pub token: Option<String>,
    pub token_expiration: Option<DateTime<Utc>>,
}

/// Input for creating a user
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about_me: Option<String>,
}

/// Input for updating a user; `None` leaves a column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub about_me: Option<String>,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, about_me)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, username, email, password_hash, about_me,
                      last_seen, token, token_expiration, created_at
            "#,
        )
        .bind(input.username)
        .bind(input.email)
        .bind(input.password_hash)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.about_me)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, first_name, last_name, username, email, password_hash, about_me,
                   last_seen, token, token_expiration, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by username (exact, case-sensitive)
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, first_name, last_name, username, email, password_hash, about_me,
                   last_seen, token, token_expiration, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, first_name, last_name, username, email, password_hash, about_me,
                   last_seen, token, token_expiration, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find the user holding a bearer token, regardless of its expiration
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, first_name, last_name, username, email, password_hash, about_me,
                   last_seen, token, token_expiration, created_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if username exists
    pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Update user fields
    pub async fn update(pool: &PgPool, id: i64, updates: UpdateUser) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                about_me = COALESCE($7, about_me)
            WHERE id = $1
            RETURNING id, first_name, last_name, username, email, password_hash, about_me,
                      last_seen, token, token_expiration, created_at
            "#,
        )
        .bind(id)
        .bind(updates.username)
        .bind(updates.email)
        .bind(updates.password_hash)
        .bind(updates.first_name)
        .bind(updates.last_name)
        .bind(updates.about_me)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replace the profile text; unlike `update`, an empty value clears it
    pub async fn set_profile(
        pool: &PgPool,
        id: i64,
        username: &str,
        about_me: Option<&str>,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET username = $2, about_me = $3
            WHERE id = $1
            RETURNING id, first_name, last_name, username, email, password_hash, about_me,
                      last_seen, token, token_expiration, created_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(about_me)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Store a new password hash
    pub async fn set_password_hash(pool: &PgPool, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp the user's last activity
    pub async fn touch_last_seen(pool: &PgPool, id: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET last_seen = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Lock a user row and read its token columns
    ///
    /// Must run inside a transaction; the lock is held until it ends.
    pub async fn lock_token(conn: &mut PgConnection, id: i64) -> Result<Option<TokenRow>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, token_expiration
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Store a freshly minted token
    pub async fn store_token(
        conn: &mut PgConnection,
        id: i64,
        token: &str,
        expiration: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET token = $2, token_expiration = $3 WHERE id = $1")
            .bind(id)
            .bind(token)
            .bind(expiration)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Move the token expiration; the token value is kept
    pub async fn set_token_expiration(
        pool: &PgPool,
        id: i64,
        expiration: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET token_expiration = $2 WHERE id = $1")
            .bind(id)
            .bind(expiration)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Course and follow counts for a user
    pub async fn stats(pool: &PgPool, id: i64) -> Result<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM courses WHERE user_id = $1) AS course_count,
                (SELECT COUNT(*) FROM followers WHERE followed_id = $1) AS follower_count,
                (SELECT COUNT(*) FROM followers WHERE follower_id = $1) AS followed_count
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }

    /// Delete a user; courses, follow edges and sessions cascade
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
