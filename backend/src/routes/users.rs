//! User and feed API routes
//!
//! Every route except registration requires a bearer token.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::repositories::UserRecord;
use crate::services::{course, CourseService, FeedService, UserService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use schedulit_shared::types::{
    CollectionMeta, CourseResponse, CreateUserRequest, UpdateUserRequest, UserCollection,
    UserResponse,
};
use sqlx::PgPool;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
        .route("/users/:id/followers", get(get_followers))
        .route("/users/:id/followed", get(get_followed))
        .route("/users/:id/courses", get(get_user_courses))
        .route("/feed", get(get_feed))
}

/// Register a new user
///
/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = UserService::register_api(state.db(), req).await?;
    let body = UserService::representation(state.db(), &user, true).await?;
    let location = format!("/api/users/{}", user.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(body)))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get(state.db(), id).await?;
    let body = UserService::representation(state.db(), &user, user.id == caller.id).await?;
    Ok(Json(body))
}

/// PUT /api/users/{id}
async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::update(state.db(), caller.id, id, req).await?;
    let body = UserService::representation(state.db(), &user, true).await?;
    Ok(Json(body))
}

async fn collection(
    pool: &PgPool,
    caller: &UserRecord,
    users: Vec<UserRecord>,
) -> ApiResult<UserCollection> {
    let mut items = Vec::with_capacity(users.len());
    for user in &users {
        items.push(UserService::representation(pool, user, user.id == caller.id).await?);
    }
    Ok(UserCollection {
        meta: CollectionMeta { total: items.len() },
        items,
    })
}

/// GET /api/users/{id}/followers
async fn get_followers(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserCollection>> {
    let user = UserService::get(state.db(), id).await?;
    let followers = FeedService::followers(state.db(), user.id).await?;
    Ok(Json(collection(state.db(), &caller, followers).await?))
}

/// GET /api/users/{id}/followed
async fn get_followed(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserCollection>> {
    let user = UserService::get(state.db(), id).await?;
    let followed = FeedService::followed(state.db(), user.id).await?;
    Ok(Json(collection(state.db(), &caller, followed).await?))
}

/// GET /api/users/{id}/courses
async fn get_user_courses(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let user = UserService::get(state.db(), id).await?;
    let courses = CourseService::list_for_user(state.db(), user.id).await?;
    Ok(Json(course::to_responses(courses)))
}

/// Caller's own and followed courses
///
/// GET /api/feed
async fn get_feed(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<CourseResponse>>> {
    let feed = FeedService::followed_courses(state.db(), caller.id).await?;
    Ok(Json(course::to_responses(feed)))
}
