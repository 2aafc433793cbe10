use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{require_session, CurrentUser},
    error::AppError,
    extract::JsonBody,
    posts::{
        dto::{CreatePostRequest, ListPostsQuery, ListPostsResponse},
        repo_types::Post,
        services,
    },
    state::AppState,
};

/// Post routes, all behind the session gate.
pub fn post_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/create", post(create_post))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_posts(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<ListPostsResponse>, AppError> {
    let res = services::list(state.posts.as_ref(), &query).await?;
    Ok(Json(res))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = services::create(state.posts.as_ref(), state.filter.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}
