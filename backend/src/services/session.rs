//! Cookie login sessions

use crate::auth::session as cookie;
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::repositories::{SessionRecord, SessionRepository, UserRecord, UserRepository};
use crate::services::UserService;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};

/// Session service for the web surface
pub struct SessionService;

impl SessionService {
    /// Sign in and open a new session
    pub async fn login(
        pool: &PgPool,
        config: &AuthConfig,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<(UserRecord, SessionRecord), ApiError> {
        let user = UserService::authenticate(pool, username, password).await?;

        let now = Utc::now();
        let purged = SessionRepository::purge_expired(pool, user.id, now)
            .await
            .map_err(ApiError::Internal)?;

        let session = SessionRepository::create(
            pool,
            &cookie::new_session_id(),
            user.id,
            remember,
            cookie::session_expiry(config, remember, now),
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(user_id = user.id, remember, purged, "user logged in");
        Ok((user, session))
    }

    /// Resolve a session id to its user, if the session is still active
    pub async fn resolve(pool: &PgPool, session_id: &str) -> Result<Option<UserRecord>, ApiError> {
        let Some(session) = SessionRepository::find_active(pool, session_id, Utc::now())
            .await
            .map_err(ApiError::Internal)?
        else {
            return Ok(None);
        };

        UserRepository::find_by_id(pool, session.user_id)
            .await
            .map_err(ApiError::Internal)
    }

    /// Stamp last activity; failures are logged, never surfaced
    pub async fn touch_last_seen(pool: &PgPool, user_id: i64) {
        if let Err(e) = UserRepository::touch_last_seen(pool, user_id, Utc::now()).await {
            warn!(user_id, error = %e, "failed to update last_seen");
        }
    }

    /// End a session; failures are logged, never surfaced
    pub async fn logout(pool: &PgPool, session_id: &str) {
        match SessionRepository::delete(pool, session_id).await {
            Ok(true) => info!("user logged out"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to delete session"),
        }
    }
}
