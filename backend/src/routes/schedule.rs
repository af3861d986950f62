//! Web pages and actions for signed-in users

use crate::auth::{session, SessionUser, LOGIN_PATH};
use crate::error::ApiResult;
use crate::services::{course, CourseService, FeedService, UserService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use schedulit_shared::types::{
    AddCourseForm, DeleteProfileForm, EditProfileForm, ExplorePage, HomePage, UserPage,
};

/// Create schedule routes
pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/index", get(home))
        .route("/add", post(add_course))
        .route("/remove_course/:id", post(remove_course))
        .route("/user/:username", get(user_page))
        .route("/edit_profile", post(edit_profile))
        .route("/delete_profile", post(delete_profile))
        .route("/follow/:username", post(follow))
        .route("/unfollow/:username", post(unfollow))
        .route("/explore", get(explore))
}

/// Own schedule plus the followed feed
///
/// GET /
async fn home(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
) -> ApiResult<Json<HomePage>> {
    let courses = CourseService::list_for_user(state.db(), user.id).await?;
    let feed = FeedService::followed_courses(state.db(), user.id).await?;
    Ok(Json(HomePage {
        user: UserService::representation(state.db(), &user, true).await?,
        courses: course::to_responses(courses),
        feed: course::to_responses(feed),
    }))
}

/// POST /add
async fn add_course(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<AddCourseForm>,
) -> ApiResult<Redirect> {
    CourseService::add(
        state.db(),
        user.id,
        &form.course,
        &form.building,
        form.time.as_deref(),
    )
    .await?;
    Ok(Redirect::to("/"))
}

/// POST /remove_course/{id}
async fn remove_course(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    CourseService::remove(state.db(), user.id, id).await?;
    Ok(Redirect::to("/"))
}

/// GET /user/{username}
async fn user_page(
    State(state): State<AppState>,
    SessionUser { user: viewer, .. }: SessionUser,
    Path(username): Path<String>,
) -> ApiResult<Json<UserPage>> {
    let user = UserService::get_by_username(state.db(), &username).await?;
    let courses = CourseService::list_for_user(state.db(), user.id).await?;
    let is_following = FeedService::is_following(state.db(), viewer.id, user.id).await?;
    Ok(Json(UserPage {
        user: UserService::representation(state.db(), &user, user.id == viewer.id).await?,
        courses: course::to_responses(courses),
        is_following,
    }))
}

/// POST /edit_profile
async fn edit_profile(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<EditProfileForm>,
) -> ApiResult<Redirect> {
    let updated =
        UserService::edit_profile(state.db(), &user, &form.username, form.about_me.as_deref())
            .await?;
    Ok(Redirect::to(&format!("/user/{}", updated.username)))
}

/// POST /delete_profile
async fn delete_profile(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
    jar: CookieJar,
    Form(form): Form<DeleteProfileForm>,
) -> ApiResult<(CookieJar, Redirect)> {
    UserService::delete_account(state.db(), &user, &form.username, &form.password).await?;
    let jar = jar.remove(session::removal_cookie(&state.config().auth));
    Ok((jar, Redirect::to(LOGIN_PATH)))
}

/// POST /follow/{username}
async fn follow(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
    Path(username): Path<String>,
) -> ApiResult<Redirect> {
    let target = FeedService::follow(state.db(), &user, &username).await?;
    Ok(Redirect::to(&format!("/user/{}", target.username)))
}

/// POST /unfollow/{username}
async fn unfollow(
    State(state): State<AppState>,
    SessionUser { user, .. }: SessionUser,
    Path(username): Path<String>,
) -> ApiResult<Redirect> {
    let target = FeedService::unfollow(state.db(), &user, &username).await?;
    Ok(Redirect::to(&format!("/user/{}", target.username)))
}

/// Every course, newest first
///
/// GET /explore
async fn explore(
    State(state): State<AppState>,
    _viewer: SessionUser,
) -> ApiResult<Json<ExplorePage>> {
    let courses = FeedService::explore(state.db()).await?;
    Ok(Json(ExplorePage {
        courses: course::to_responses(courses),
    }))
}
