//! HTTP-only cookie plumbing for the two auth tokens.
//!
//! Values are written as raw `Set-Cookie` strings so the attribute set
//! (HttpOnly, SameSite, Path, Max-Age) is explicit and in one place;
//! reads go through [`CookieJar`].

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

pub const ACCESS_COOKIE: &str = "access-token";
pub const REFRESH_COOKIE: &str = "refresh-token";

/// Build a `Set-Cookie` value for an auth cookie.
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

/// Build a `Set-Cookie` value that deletes the cookie.
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Read a cookie value from request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|c| c.value().to_string())
}
