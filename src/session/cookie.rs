use actix_web::cookie::{
    time::{Duration, OffsetDateTime},
    Cookie, SameSite,
};
use actix_web::HttpRequest;

use crate::settings::DashgateSettings;
use crate::utils::logging::LoggingHelper;

/// Default refresh cookie name, overridable through `REFRESH_COOKIE_NAME`
pub const DEFAULT_REFRESH_COOKIE_NAME: &str = "refresh";

/// Lifetime of the refresh cookie in days
pub const REFRESH_COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Duration,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: Duration::days(REFRESH_COOKIE_MAX_AGE_DAYS),
        }
    }
}

/// Server-side store for the refresh token
///
/// The token only ever travels inside an HTTP-only, site-wide cookie, so page
/// scripts cannot read it. `set` and `clear` produce the cookie for the
/// handler to attach as a `Set-Cookie` header; `get` reads it back from an
/// incoming request.
#[derive(Debug, Clone)]
pub struct RefreshCookieStore {
    cookie_name: String,
    cookie_secure: bool,
    max_age: Duration,
}

impl RefreshCookieStore {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>, cookie_secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            cookie_secure,
            max_age: Duration::days(REFRESH_COOKIE_MAX_AGE_DAYS),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &DashgateSettings) -> Self {
        Self {
            cookie_name: settings.cookies.refresh_cookie_name.clone(),
            cookie_secure: settings.cookie_secure(),
            max_age: Duration::days(settings.cookies.max_age_days),
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Build a cookie under the store's name
    #[must_use]
    pub fn create_cookie(&self, value: &str, options: CookieOptions) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone(), value.to_owned())
            .http_only(options.http_only)
            .secure(self.cookie_secure && options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .max_age(options.max_age)
            .finish()
    }

    /// Cookie carrying a freshly issued refresh token
    #[must_use]
    pub fn set(&self, refresh_token: &str) -> Cookie<'static> {
        LoggingHelper::log_cookie_issued(&self.cookie_name, self.cookie_secure);
        self.create_cookie(
            refresh_token,
            CookieOptions {
                max_age: self.max_age,
                ..Default::default()
            },
        )
    }

    /// Cookie that deletes the refresh token
    ///
    /// Sets both `Max-Age=0` and an epoch `Expires` so browsers that only
    /// honour one of the two still drop it.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        LoggingHelper::log_cookie_cleared(&self.cookie_name);
        let mut cookie = self.create_cookie(
            "",
            CookieOptions {
                max_age: Duration::ZERO,
                ..Default::default()
            },
        );
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }

    /// Read the refresh token from a request; an empty value counts as absent
    #[must_use]
    pub fn get(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(&self.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Whether the request carries a refresh cookie at all
    #[must_use]
    pub fn is_present(&self, req: &HttpRequest) -> bool {
        self.get(req).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_set_cookie_attributes() {
        let store = RefreshCookieStore::new("refresh", false);
        let cookie = store.set("RT1");

        assert_eq!(cookie.name(), "refresh");
        assert_eq!(cookie.value(), "RT1");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn test_secure_follows_environment() {
        let mut settings = DashgateSettings::default();
        settings.application.environment = "production".to_string();
        let cookie = RefreshCookieStore::from_settings(&settings).set("RT1");
        assert_eq!(cookie.secure(), Some(true));

        settings.application.environment = "development".to_string();
        let cookie = RefreshCookieStore::from_settings(&settings).set("RT1");
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_clear_cookie_expires_at_epoch() {
        let store = RefreshCookieStore::new("refresh", true);
        let cookie = store.clear();

        assert_eq!(cookie.name(), "refresh");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[test]
    fn test_get_reads_named_cookie() {
        let store = RefreshCookieStore::new("refresh", false);

        let req = TestRequest::default()
            .cookie(Cookie::new("refresh", "RT9"))
            .to_http_request();
        assert_eq!(store.get(&req).as_deref(), Some("RT9"));

        let req = TestRequest::default()
            .cookie(Cookie::new("final-refresh-token", "RT9"))
            .to_http_request();
        assert_eq!(store.get(&req), None);
    }

    #[test]
    fn test_empty_cookie_counts_as_absent() {
        let store = RefreshCookieStore::new("refresh", false);
        let req = TestRequest::default()
            .cookie(Cookie::new("refresh", ""))
            .to_http_request();
        assert!(!store.is_present(&req));
    }

    #[test]
    fn test_configured_max_age() {
        let mut settings = DashgateSettings::default();
        settings.cookies.max_age_days = 2;
        let cookie = RefreshCookieStore::from_settings(&settings).set("RT1");
        assert_eq!(cookie.max_age(), Some(Duration::days(2)));
    }
}
