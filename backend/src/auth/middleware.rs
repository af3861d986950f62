//! Request extractors for the three ways a caller identifies itself
//!
//! - `AuthUser`: API bearer token
//! - `BasicAuth`: HTTP Basic username/password, only used to obtain a token
//! - `SessionUser`: login session cookie on the web surface

use crate::error::ApiError;
use crate::repositories::UserRecord;
use crate::services::{SessionService, TokenService, UserService};
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine};

/// Where unauthenticated web requests are sent
pub const LOGIN_PATH: &str = "/auth/login";

/// Value of an `Authorization: <scheme> <value>` header
fn authorization<'a>(headers: &'a HeaderMap, scheme: &str) -> Option<&'a str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (given, rest) = value.split_once(' ')?;
    given.eq_ignore_ascii_case(scheme).then(|| rest.trim())
}

/// Decode HTTP Basic credentials
fn parse_basic(encoded: &str) -> Option<(String, String)> {
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// User authenticated by bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRecord);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = authorization(&parts.headers, "Bearer").ok_or(ApiError::InvalidToken)?;
        let user = TokenService::check_token(app_state.db(), token).await?;
        SessionService::touch_last_seen(app_state.db(), user.id).await;

        Ok(AuthUser(user))
    }
}

/// User authenticated by HTTP Basic credentials
#[derive(Debug, Clone)]
pub struct BasicAuth(pub UserRecord);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for BasicAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let (username, password) = authorization(&parts.headers, "Basic")
            .and_then(parse_basic)
            .ok_or(ApiError::InvalidCredentials)?;
        let user = UserService::authenticate(app_state.db(), &username, &password).await?;

        Ok(BasicAuth(user))
    }
}

/// User signed in through a session cookie
///
/// Requests without an active session are redirected to the login page.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: UserRecord,
    pub session_id: String,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for SessionUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(session_id) = jar
            .get(&app_state.config().auth.session_cookie)
            .map(|c| c.value().to_string())
        else {
            return Err(Redirect::to(LOGIN_PATH).into_response());
        };

        let user = SessionService::resolve(app_state.db(), &session_id)
            .await
            .map_err(IntoResponse::into_response)?
            .ok_or_else(|| Redirect::to(LOGIN_PATH).into_response())?;
        SessionService::touch_last_seen(app_state.db(), user.id).await;

        Ok(SessionUser { user, session_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorization_scheme_matching() {
        let headers = headers_with("Bearer abc");
        assert_eq!(authorization(&headers, "Bearer"), Some("abc"));
        assert_eq!(authorization(&headers, "bearer"), Some("abc"));
        assert_eq!(authorization(&headers, "Basic"), None);
        assert_eq!(authorization(&HeaderMap::new(), "Bearer"), None);
        assert_eq!(authorization(&headers_with("Bearer"), "Bearer"), None);
    }

    #[test]
    fn test_parse_basic() {
        let encoded = STANDARD.encode("alice:pa:ss");
        assert_eq!(
            parse_basic(&encoded),
            Some(("alice".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(parse_basic(&STANDARD.encode("no-colon")), None);
        assert_eq!(parse_basic("%%%not-base64"), None);
    }
}
