//! Bearer token issuance, revocation and lookup

use crate::auth::bearer;
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use schedulit_shared::errors::AuthError;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

/// Bearer token service
pub struct TokenService;

impl TokenService {
    /// Return the user's current token, minting a new one when needed
    ///
    /// The user row stays locked for the duration, so concurrent calls for the
    /// same user see each other's rotation.
    pub async fn get_token(
        pool: &PgPool,
        user_id: i64,
        ttl_secs: i64,
        reuse_window_secs: i64,
    ) -> Result<String, ApiError> {
        let mut tx = pool.begin().await?;

        let current = UserRepository::lock_token(&mut *tx, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let now = Utc::now();
        if let Some(token) = current.token {
            if bearer::can_reuse(current.token_expiration, now, reuse_window_secs) {
                tx.commit().await?;
                debug!(user_id, "reusing bearer token");
                return Ok(token);
            }
        }

        let token = bearer::generate_token();
        let expiration = now + Duration::seconds(ttl_secs);
        UserRepository::store_token(&mut *tx, user_id, &token, expiration)
            .await
            .map_err(ApiError::Internal)?;
        tx.commit().await?;

        info!(user_id, expires_at = %expiration, "bearer token minted");
        Ok(token)
    }

    /// Expire the user's token immediately
    pub async fn revoke_token(pool: &PgPool, user_id: i64) -> Result<(), ApiError> {
        let expiration = bearer::revoked_expiration(Utc::now());
        UserRepository::set_token_expiration(pool, user_id, expiration)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id, "bearer token revoked");
        Ok(())
    }

    /// Resolve a presented token to its live owner
    pub async fn check_token(pool: &PgPool, token: &str) -> Result<UserRecord, ApiError> {
        if !bearer::is_well_formed(token) {
            return Err(AuthError::InvalidToken.into());
        }

        let user = UserRepository::find_by_token(pool, token)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(AuthError::InvalidToken)?;

        if !bearer::is_live(user.token_expiration, Utc::now()) {
            debug!(user_id = user.id, "expired bearer token presented");
            return Err(AuthError::InvalidToken.into());
        }

        Ok(user)
    }
}
