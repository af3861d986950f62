//! Follow graph and the course feed

use crate::error::ApiError;
use crate::repositories::{CourseRecord, CourseRepository, FollowRepository, UserRecord};
use crate::services::UserService;
use sqlx::PgPool;
use tracing::info;

/// Feed and follow service
pub struct FeedService;

impl FeedService {
    /// Own courses plus those of every followed user, newest first
    pub async fn followed_courses(pool: &PgPool, user_id: i64) -> Result<Vec<CourseRecord>, ApiError> {
        CourseRepository::followed_courses(pool, user_id)
            .await
            .map_err(ApiError::Internal)
    }

    /// Every course, newest first
    pub async fn explore(pool: &PgPool) -> Result<Vec<CourseRecord>, ApiError> {
        CourseRepository::list_all(pool)
            .await
            .map_err(ApiError::Internal)
    }

    /// Follow a user by username; following twice is a no-op
    pub async fn follow(
        pool: &PgPool,
        user: &UserRecord,
        username: &str,
    ) -> Result<UserRecord, ApiError> {
        let target = UserService::get_by_username(pool, username).await?;
        if target.id == user.id {
            return Err(ApiError::Validation("You cannot follow yourself!".to_string()));
        }

        let created = FollowRepository::follow(pool, user.id, target.id)
            .await
            .map_err(ApiError::Internal)?;
        if created {
            info!(follower_id = user.id, followed_id = target.id, "user followed");
        }
        Ok(target)
    }

    /// Unfollow a user by username; a missing edge is a no-op
    pub async fn unfollow(
        pool: &PgPool,
        user: &UserRecord,
        username: &str,
    ) -> Result<UserRecord, ApiError> {
        let target = UserService::get_by_username(pool, username).await?;
        if target.id == user.id {
            return Err(ApiError::Validation("You cannot unfollow yourself!".to_string()));
        }

        let removed = FollowRepository::unfollow(pool, user.id, target.id)
            .await
            .map_err(ApiError::Internal)?;
        if removed {
            info!(follower_id = user.id, followed_id = target.id, "user unfollowed");
        }
        Ok(target)
    }

    /// Whether `follower_id` follows `followed_id`
    pub async fn is_following(pool: &PgPool, follower_id: i64, followed_id: i64) -> Result<bool, ApiError> {
        FollowRepository::is_following(pool, follower_id, followed_id)
            .await
            .map_err(ApiError::Internal)
    }

    /// Users following `user_id`
    pub async fn followers(pool: &PgPool, user_id: i64) -> Result<Vec<UserRecord>, ApiError> {
        FollowRepository::followers(pool, user_id)
            .await
            .map_err(ApiError::Internal)
    }

    /// Users `user_id` follows
    pub async fn followed(pool: &PgPool, user_id: i64) -> Result<Vec<UserRecord>, ApiError> {
        FollowRepository::followed(pool, user_id)
            .await
            .map_err(ApiError::Internal)
    }
}
