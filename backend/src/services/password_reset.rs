//! "Forgot password" flow
//!
//! A request mails a signed link; following it lets the holder set a new
//! password until the link expires.

use crate::auth::{PasswordService, ResetTokenService};
use crate::error::ApiError;
use crate::repositories::{UserRecord, UserRepository};
use crate::services::mail::Mailer;
use schedulit_shared::validation::{validate_password, validate_password_confirmation};
use sqlx::PgPool;
use tracing::{error, info};

/// Password reset service
pub struct PasswordResetService;

impl PasswordResetService {
    /// Build the link sent in the reset email
    pub fn reset_url(base_url: &str, token: &str) -> String {
        format!("{}/auth/reset_password/{}", base_url.trim_end_matches('/'), token)
    }

    /// Send a reset link if the address belongs to a user
    ///
    /// The outcome is the same whether or not the address is known, and a
    /// mail failure is only logged.
    pub async fn request(
        pool: &PgPool,
        resets: &ResetTokenService,
        mailer: &dyn Mailer,
        base_url: &str,
        email: &str,
    ) -> Result<(), ApiError> {
        let Some(user) = UserRepository::find_by_email(pool, email.trim())
            .await
            .map_err(ApiError::Internal)?
        else {
            return Ok(());
        };

        let token = resets.issue(user.id).map_err(ApiError::Internal)?;
        let url = Self::reset_url(base_url, &token);

        match mailer.send_password_reset(&user.email, &user.username, &url).await {
            Ok(()) => info!(user_id = user.id, "password reset requested"),
            Err(e) => error!(user_id = user.id, error = %e, "failed to send password reset email"),
        }
        Ok(())
    }

    /// User a reset token names, if the token is valid and the user exists
    pub async fn verify(
        pool: &PgPool,
        resets: &ResetTokenService,
        token: &str,
    ) -> Result<Option<UserRecord>, ApiError> {
        let Some(user_id) = resets.verify(token) else {
            return Ok(None);
        };
        UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)
    }

    /// Set a new password with a reset token
    ///
    /// `Ok(None)` means the token was not accepted.
    pub async fn reset(
        pool: &PgPool,
        resets: &ResetTokenService,
        token: &str,
        password: &str,
        password2: &str,
    ) -> Result<Option<UserRecord>, ApiError> {
        let Some(user) = Self::verify(pool, resets, token).await? else {
            return Ok(None);
        };

        validate_password(password).map_err(ApiError::Validation)?;
        validate_password_confirmation(password, password2).map_err(ApiError::Validation)?;

        let hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;
        UserRepository::set_password_hash(pool, user.id, &hash)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = user.id, "password reset");
        Ok(Some(user))
    }
}
