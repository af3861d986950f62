//! User service: registration, profile changes, account deletion and the
//! user representation
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::PasswordService;
use crate::db;
use crate::error::ApiError;
use crate::repositories::{CreateUser, UpdateUser, UserRecord, UserRepository, UserStats};
use chrono::{DateTime, SecondsFormat, Utc};
use schedulit_shared::errors::AuthError;
use schedulit_shared::types::{
    CreateUserRequest, RegisterForm, UpdateUserRequest, UserLinks, UserResponse,
};
use schedulit_shared::validation::{
    validate_about_me, validate_email, validate_name, validate_password,
    validate_password_confirmation, validate_username, MAX_FIRST_NAME_LEN, MAX_LAST_NAME_LEN,
};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{info, warn};

pub const MISSING_FIELDS: &str = "must include username, email, and password fields";
pub const USERNAME_TAKEN: &str = "Please use a different username";
pub const EMAIL_TAKEN: &str = "Please use a different email address";

const AVATAR_SIZE: u32 = 128;

/// Gravatar identicon URL for an email address
pub fn avatar_url(email: &str, size: u32) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon&s={}",
        hex::encode(digest),
        size
    )
}

/// ISO-8601 UTC timestamp with a trailing `Z`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Map a user row to its wire shape
///
/// `include_email` is set only when the caller is the user themselves.
pub fn to_response(user: &UserRecord, stats: UserStats, include_email: bool) -> UserResponse {
    let base = format!("/api/users/{}", user.id);
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: include_email.then(|| user.email.clone()),
        about_me: user.about_me.clone(),
        last_seen: Some(format_timestamp(user.last_seen)),
        course_count: stats.course_count,
        follower_count: stats.follower_count,
        followed_count: stats.followed_count,
        links: UserLinks {
            followers: format!("{}/followers", base),
            followed: format!("{}/followed", base),
            avatar: avatar_url(&user.email, AVATAR_SIZE),
            self_link: base,
        },
    }
}

/// Translate a unique-constraint violation on `users` into the form message
fn map_unique_violation(err: anyhow::Error) -> ApiError {
    match db::unique_violation(&err).as_deref() {
        Some("users_username_key") => ApiError::Validation(USERNAME_TAKEN.to_string()),
        Some("users_email_key") => ApiError::Validation(EMAIL_TAKEN.to_string()),
        _ => ApiError::Internal(err),
    }
}

/// Blank optional text becomes `None`
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Length-check optional name fields; blank values are dropped later
fn validate_optional_names(
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<(), ApiError> {
    if let Some(first) = first_name.filter(|v| !v.trim().is_empty()) {
        validate_name("First name", first, MAX_FIRST_NAME_LEN).map_err(ApiError::Validation)?;
    }
    if let Some(last) = last_name.filter(|v| !v.trim().is_empty()) {
        validate_name("Last name", last, MAX_LAST_NAME_LEN).map_err(ApiError::Validation)?;
    }
    Ok(())
}

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Register through the JSON API
    pub async fn register_api(
        pool: &PgPool,
        request: CreateUserRequest,
    ) -> Result<UserRecord, ApiError> {
        let (Some(username), Some(email), Some(password)) =
            (request.username, request.email, request.password)
        else {
            return Err(ApiError::Validation(MISSING_FIELDS.to_string()));
        };

        validate_username(&username).map_err(ApiError::Validation)?;
        validate_email(&email).map_err(ApiError::Validation)?;
        validate_password(&password).map_err(ApiError::Validation)?;
        if let Some(about_me) = &request.about_me {
            validate_about_me(about_me).map_err(ApiError::Validation)?;
        }
        validate_optional_names(request.first_name.as_deref(), request.last_name.as_deref())?;

        Self::create(
            pool,
            username,
            email,
            password,
            non_blank(request.first_name),
            non_blank(request.last_name),
            non_blank(request.about_me),
        )
        .await
    }

    /// Register through the web form
    pub async fn register_web(pool: &PgPool, form: RegisterForm) -> Result<UserRecord, ApiError> {
        validate_name("First name", &form.first_name, MAX_FIRST_NAME_LEN)
            .map_err(ApiError::Validation)?;
        validate_name("Last name", &form.last_name, MAX_LAST_NAME_LEN)
            .map_err(ApiError::Validation)?;
        validate_username(&form.username).map_err(ApiError::Validation)?;
        validate_email(&form.email).map_err(ApiError::Validation)?;
        validate_password(&form.password).map_err(ApiError::Validation)?;
        validate_password_confirmation(&form.password, &form.password2)
            .map_err(ApiError::Validation)?;

        Self::create(
            pool,
            form.username,
            form.email,
            form.password,
            non_blank(Some(form.first_name)),
            non_blank(Some(form.last_name)),
            None,
        )
        .await
    }

    async fn create(
        pool: &PgPool,
        username: String,
        email: String,
        password: String,
        first_name: Option<String>,
        last_name: Option<String>,
        about_me: Option<String>,
    ) -> Result<UserRecord, ApiError> {
        if UserRepository::username_exists(pool, &username)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Validation(USERNAME_TAKEN.to_string()));
        }
        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Validation(EMAIL_TAKEN.to_string()));
        }

        let password_hash = PasswordService::hash_async(password)
            .await
            .map_err(ApiError::Internal)?;

        // A concurrent registration can still win between the checks and the
        // insert; the unique constraints catch it.
        let user = UserRepository::create(
            pool,
            CreateUser {
                username,
                email,
                password_hash,
                first_name,
                last_name,
                about_me,
            },
        )
        .await
        .map_err(map_unique_violation)?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Look a user up by id
    pub async fn get(pool: &PgPool, id: i64) -> Result<UserRecord, ApiError> {
        UserRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Look a user up by username
    pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<UserRecord, ApiError> {
        UserRepository::find_by_username(pool, username)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found.", username)))
    }

    /// Build the wire representation, including counts
    pub async fn representation(
        pool: &PgPool,
        user: &UserRecord,
        include_email: bool,
    ) -> Result<UserResponse, ApiError> {
        let stats = UserRepository::stats(pool, user.id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(to_response(user, stats, include_email))
    }

    /// Verify a username/password pair
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    pub async fn authenticate(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, ApiError> {
        let user = UserRepository::find_by_username(pool, username)
            .await
            .map_err(ApiError::Internal)?;

        let Some(user) = user else {
            warn!(username = %username, "login attempt for unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = PasswordService::check(password, user.password_hash.as_deref())
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            warn!(user_id = user.id, "login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Update a user through the API
    ///
    /// Only the token owner may modify the record.
    pub async fn update(
        pool: &PgPool,
        caller_id: i64,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserRecord, ApiError> {
        if caller_id != id {
            return Err(ApiError::Forbidden(
                "You can only modify your own account".to_string(),
            ));
        }
        validate_optional_names(request.first_name.as_deref(), request.last_name.as_deref())?;
        let current = Self::get(pool, id).await?;

        let username = request.username.filter(|u| *u != current.username);
        let email = request.email.filter(|e| *e != current.email);

        if let Some(username) = &username {
            validate_username(username).map_err(ApiError::Validation)?;
            if UserRepository::username_exists(pool, username)
                .await
                .map_err(ApiError::Internal)?
            {
                return Err(ApiError::Validation(USERNAME_TAKEN.to_string()));
            }
        }
        if let Some(email) = &email {
            validate_email(email).map_err(ApiError::Validation)?;
            if UserRepository::email_exists(pool, email)
                .await
                .map_err(ApiError::Internal)?
            {
                return Err(ApiError::Validation(EMAIL_TAKEN.to_string()));
            }
        }
        if let Some(about_me) = &request.about_me {
            validate_about_me(about_me).map_err(ApiError::Validation)?;
        }

        let password_hash = match request.password {
            Some(password) => {
                validate_password(&password).map_err(ApiError::Validation)?;
                Some(
                    PasswordService::hash_async(password)
                        .await
                        .map_err(ApiError::Internal)?,
                )
            }
            None => None,
        };

        let updated = UserRepository::update(
            pool,
            id,
            UpdateUser {
                username,
                email,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                about_me: request.about_me,
            },
        )
        .await
        .map_err(map_unique_violation)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = id, "user updated");
        Ok(updated)
    }

    /// Change username and "about me" from the profile form
    pub async fn edit_profile(
        pool: &PgPool,
        user: &UserRecord,
        username: &str,
        about_me: Option<&str>,
    ) -> Result<UserRecord, ApiError> {
        validate_username(username).map_err(ApiError::Validation)?;
        let about_me = about_me.map(str::trim).filter(|a| !a.is_empty());
        if let Some(about_me) = about_me {
            validate_about_me(about_me).map_err(ApiError::Validation)?;
        }

        if username != user.username
            && UserRepository::username_exists(pool, username)
                .await
                .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Validation(USERNAME_TAKEN.to_string()));
        }

        let updated = UserRepository::set_profile(pool, user.id, username, about_me)
            .await
            .map_err(map_unique_violation)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = user.id, "profile edited");
        Ok(updated)
    }

    /// Delete the signed-in account
    ///
    /// The typed username must match the account and the password must verify.
    pub async fn delete_account(
        pool: &PgPool,
        user: &UserRecord,
        username: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        if username != user.username {
            warn!(user_id = user.id, "account deletion with mismatched username");
            return Err(ApiError::InvalidCredentials);
        }
        let valid = PasswordService::check(password, user.password_hash.as_deref())
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            warn!(user_id = user.id, "account deletion with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        UserRepository::delete(pool, user.id)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = user.id, "account deleted");
        Ok(())
    }
}
