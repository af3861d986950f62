//! Course repository
//!
//! Every read joins the author's username so callers never need a second
//! lookup per row.

use anyhow::Result;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;

/// Course record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseRecord {
    pub id: i64,
    pub name: String,
    pub building: Option<String>,
    pub meets_at: Option<NaiveTime>,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub author: String,
}

/// Input for creating a course
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub name: String,
    pub building: Option<String>,
    pub meets_at: Option<NaiveTime>,
}

/// Course repository for database operations
pub struct CourseRepository;

impl CourseRepository {
    /// Create a course owned by `user_id`
    pub async fn create(pool: &PgPool, user_id: i64, input: CreateCourse) -> Result<CourseRecord> {
        let course = sqlx::query_as::<_, CourseRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO courses (name, building, meets_at, user_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, building, meets_at, timestamp, user_id
            )
            SELECT c.id, c.name, c.building, c.meets_at, c.timestamp, c.user_id,
                   u.username AS author
            FROM inserted c
            JOIN users u ON u.id = c.user_id
            "#,
        )
        .bind(input.name)
        .bind(input.building)
        .bind(input.meets_at)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(course)
    }

    /// Courses owned by a user, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<CourseRecord>> {
        let courses = sqlx::query_as::<_, CourseRecord>(
            r#"
            SELECT c.id, c.name, c.building, c.meets_at, c.timestamp, c.user_id,
                   u.username AS author
            FROM courses c
            JOIN users u ON u.id = c.user_id
            WHERE c.user_id = $1
            ORDER BY c.timestamp DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Delete a course if and only if `user_id` owns it
    pub async fn delete_owned(pool: &PgPool, user_id: i64, course_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Feed for a user: courses of everyone they follow plus their own
    ///
    /// `UNION` drops duplicate rows, so a course appears once.
    pub async fn followed_courses(pool: &PgPool, user_id: i64) -> Result<Vec<CourseRecord>> {
        let courses = sqlx::query_as::<_, CourseRecord>(
            r#"
            SELECT feed.id, feed.name, feed.building, feed.meets_at, feed.timestamp,
                   feed.user_id, u.username AS author
            FROM (
                SELECT c.id, c.name, c.building, c.meets_at, c.timestamp, c.user_id
                FROM courses c
                JOIN followers f ON f.followed_id = c.user_id
                WHERE f.follower_id = $1
                UNION
                SELECT c.id, c.name, c.building, c.meets_at, c.timestamp, c.user_id
                FROM courses c
                WHERE c.user_id = $1
            ) AS feed
            JOIN users u ON u.id = feed.user_id
            ORDER BY feed.timestamp DESC, feed.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }

    /// Every course, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<CourseRecord>> {
        let courses = sqlx::query_as::<_, CourseRecord>(
            r#"
            SELECT c.id, c.name, c.building, c.meets_at, c.timestamp, c.user_id,
                   u.username AS author
            FROM courses c
            JOIN users u ON u.id = c.user_id
            ORDER BY c.timestamp DESC, c.id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }
}
