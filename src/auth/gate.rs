use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};
use uuid::Uuid;

use super::cookie::COOKIE_NAME;
use super::jwt::SessionKeys;
use crate::error::AppError;

pub const MISSING_TOKEN: &str = "missing or invalid token";
pub const MALFORMED_HEADER: &str = "invalid token format";
pub const INVALID_TOKEN: &str = "invalid or expired token";

/// Identity of the caller, attached to the request by [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Reads the session token from the `auth_token` cookie, falling back to
/// an `Authorization: Bearer <token>` header.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Ok(cookie.value().to_owned());
        }
    }

    let auth = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Auth(MISSING_TOKEN.into()))?
        .to_str()
        .map_err(|_| AppError::Auth(MALFORMED_HEADER.into()))?;
    if auth.is_empty() {
        return Err(AppError::Auth(MISSING_TOKEN.into()));
    }

    // Exactly "<scheme> <token>" with a case-insensitive Bearer scheme.
    let parts: Vec<&str> = auth.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok((*token).to_owned())
        }
        _ => Err(AppError::Auth(MALFORMED_HEADER.into())),
    }
}

/// Rejects requests without a valid session; otherwise stores [`CurrentUser`]
/// in the request extensions for downstream handlers.
pub async fn require_session(
    State(keys): State<SessionKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;
    let claims = keys.verify(&token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::Auth(INVALID_TOKEN.into())
    })?;

    debug!(user_id = %claims.user_id, "session accepted");
    req.extensions_mut().insert(CurrentUser {
        user_id: claims.user_id,
        username: claims.username,
    });
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Auth(MISSING_TOKEN.into()))
    }
}
