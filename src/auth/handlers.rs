use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        cookie::{clear_cookie, session_cookie},
        dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
        repo_types::User,
        services,
    },
    error::AppError,
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (user, issued) = services::login(state.users.as_ref(), &state.keys, payload).await?;
    let jar = jar.add(session_cookie(issued.token, issued.expires_at));
    Ok((
        jar,
        Json(LoginResponse {
            message: "login successful",
            user: user.into(),
        }),
    ))
}

/// Tells the client to drop the session cookie. The token itself stays
/// valid until it expires; there is no server-side revocation list.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    info!("user logged out");
    (
        jar.add(clear_cookie()),
        Json(MessageResponse {
            message: "logout successful",
        }),
    )
}
