//! Custom assertion helpers for response and cookie checks

use actix_web::cookie::{time::Duration, Cookie};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;

/// Owned copy of the named cookie set by a response
#[must_use]
pub fn response_cookie<B>(response: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(Cookie::into_owned)
}

/// Number of `Set-Cookie` headers on a response
#[must_use]
pub fn set_cookie_count<B>(response: &ServiceResponse<B>) -> usize {
    response.headers().get_all(header::SET_COOKIE).count()
}

/// Assert that a response is a 302 to `location`
///
/// # Panics
///
/// Panics if the status is not 302 or the `Location` header differs.
pub fn assert_redirect_to<B>(response: &ServiceResponse<B>, location: &str) {
    assert_eq!(response.status().as_u16(), 302, "Expected a redirect");
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(location),
        "Unexpected redirect target"
    );
}

/// Assert that a cookie is a deletion of the refresh cookie
///
/// # Panics
///
/// Panics if the cookie has a value or would survive in the browser.
pub fn assert_cleared_cookie(cookie: &Cookie<'_>) {
    assert_eq!(cookie.value(), "", "Cleared cookie must be empty");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO), "Max-Age must be 0");
    assert_eq!(cookie.http_only(), Some(true), "Cookie must stay HTTP-only");
    assert_eq!(cookie.path(), Some("/"));
}
