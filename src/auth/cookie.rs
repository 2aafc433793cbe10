use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

pub const COOKIE_NAME: &str = "auth_token";

/// Creates the session cookie holding a signed token until `expires_at`.
pub fn session_cookie(token: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .expires(expires_at)
        .into()
}

/// Creates an already expired session cookie used to discard a previous one.
pub fn clear_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::now_utc() - Duration::hours(1))
        .into()
}
