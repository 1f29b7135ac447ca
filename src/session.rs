use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;

pub const SESSION_COOKIE_NAME: &str = "session";

/// Reads the session token from the `session` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn get_session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
