//! Web sign-in, sign-out, registration and password reset
//!
//! Form posts answer with 303 redirects. Failures are reported through the
//! usual JSON error body.

use crate::auth::{session, SessionUser, LOGIN_PATH};
use crate::error::ApiResult;
use crate::services::{PasswordResetService, SessionService, UserService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use schedulit_shared::types::{
    LoginForm, LoginQuery, RegisterForm, ResetPasswordForm, ResetPasswordRequestForm,
};

/// Create web auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/register", post(register))
        .route("/reset_password_request", post(reset_password_request))
        .route("/reset_password/:token", post(reset_password))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    current: Option<SessionUser>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> ApiResult<(CookieJar, Redirect)> {
    if current.is_some() {
        return Ok((jar, Redirect::to("/")));
    }

    let auth = &state.config().auth;
    let (_, created) = SessionService::login(
        state.db(),
        auth,
        &form.username,
        &form.password,
        form.remember(),
    )
    .await?;

    let jar = jar.add(session::session_cookie(auth, &created.id, created.remember));
    let next = session::safe_next(query.next.as_deref());
    Ok((jar, Redirect::to(&next)))
}

/// GET /auth/logout
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let auth = &state.config().auth;
    if let Some(cookie) = jar.get(&auth.session_cookie) {
        SessionService::logout(state.db(), cookie.value()).await;
    }
    (jar.remove(session::removal_cookie(auth)), Redirect::to("/"))
}

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    current: Option<SessionUser>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Redirect> {
    if current.is_some() {
        return Ok(Redirect::to("/"));
    }
    UserService::register_web(state.db(), form).await?;
    Ok(Redirect::to(LOGIN_PATH))
}

/// POST /auth/reset_password_request
///
/// Always lands on the login page, whether or not the address is known.
async fn reset_password_request(
    State(state): State<AppState>,
    current: Option<SessionUser>,
    Form(form): Form<ResetPasswordRequestForm>,
) -> ApiResult<Redirect> {
    if current.is_some() {
        return Ok(Redirect::to("/"));
    }
    PasswordResetService::request(
        state.db(),
        state.resets(),
        state.mailer(),
        &state.config().mail.base_url,
        &form.email,
    )
    .await?;
    Ok(Redirect::to(LOGIN_PATH))
}

/// POST /auth/reset_password/{token}
async fn reset_password(
    State(state): State<AppState>,
    current: Option<SessionUser>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> ApiResult<Redirect> {
    if current.is_some() {
        return Ok(Redirect::to("/"));
    }
    let reset = PasswordResetService::reset(
        state.db(),
        state.resets(),
        &token,
        &form.password,
        &form.password2,
    )
    .await?;

    match reset {
        Some(_) => Ok(Redirect::to(LOGIN_PATH)),
        None => Ok(Redirect::to("/")),
    }
}
