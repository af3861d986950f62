//! API token routes

use crate::auth::{AuthUser, BasicAuth};
use crate::error::ApiResult;
use crate::services::TokenService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use schedulit_shared::types::TokenResponse;

/// Create token routes
pub fn token_routes() -> Router<AppState> {
    Router::new().route("/tokens", post(get_token).delete(revoke_token))
}

/// Exchange HTTP Basic credentials for a bearer token
///
/// POST /api/tokens
async fn get_token(
    State(state): State<AppState>,
    BasicAuth(user): BasicAuth,
) -> ApiResult<Json<TokenResponse>> {
    let auth = &state.config().auth;
    let token = TokenService::get_token(
        state.db(),
        user.id,
        auth.token_ttl_secs,
        auth.token_reuse_window_secs,
    )
    .await?;
    Ok(Json(TokenResponse { token }))
}

/// DELETE /api/tokens
async fn revoke_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<StatusCode> {
    TokenService::revoke_token(state.db(), user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
