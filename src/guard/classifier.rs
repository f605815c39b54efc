use regex::Regex;
use std::sync::LazyLock;

use crate::settings::DashgateSettings;

/// Health route, always reachable
pub const HEALTH_PATH: &str = "/ping";

// Files the shell page pulls in by extension, wherever they are served from
static STATIC_ASSET_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:css|js|mjs|map|png|jpe?g|gif|svg|ico|webp|woff2?|ttf|eot|txt|json)$").ok()
});

/// Outcome of classifying a page navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
}

/// Decides which navigations need a session cookie
///
/// Purely a presence check on the refresh cookie: tokens are not validated
/// or refreshed here and the backend is never contacted.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    api_prefix: String,
    auth_routes: Vec<String>,
    public_prefixes: Vec<String>,
    login_path: String,
}

impl RouteGuard {
    #[must_use]
    pub fn new(
        api_prefix: impl Into<String>,
        auth_routes: Vec<String>,
        public_prefixes: Vec<String>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            api_prefix: api_prefix.into().trim_end_matches('/').to_string(),
            auth_routes,
            public_prefixes,
            login_path: login_path.into(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &DashgateSettings) -> Self {
        let guard = &settings.guard;
        Self::new(
            guard.api_prefix.clone(),
            guard.auth_routes.clone(),
            guard.public_prefixes.clone(),
            guard.login_path.clone(),
        )
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Classify a request path; first match wins
    #[must_use]
    pub fn classify(&self, path: &str, has_refresh_cookie: bool) -> GuardDecision {
        if self.is_public(path) || has_refresh_cookie {
            GuardDecision::Allow
        } else {
            GuardDecision::RedirectToLogin
        }
    }

    /// Paths reachable without any session
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.is_api_route(path)
            || self.is_auth_route(path)
            || path == HEALTH_PATH
            || self.is_static_asset(path)
    }

    fn is_api_route(&self, path: &str) -> bool {
        path.strip_prefix(self.api_prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    fn is_auth_route(&self, path: &str) -> bool {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        self.auth_routes.iter().any(|route| route == path)
    }

    fn is_static_asset(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            || STATIC_ASSET_PATTERN
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> RouteGuard {
        RouteGuard::from_settings(&DashgateSettings::default())
    }

    #[test]
    fn test_api_routes_always_allowed() {
        let guard = guard();
        assert_eq!(guard.classify("/api", false), GuardDecision::Allow);
        assert_eq!(guard.classify("/api/anything", false), GuardDecision::Allow);
        assert_eq!(guard.classify("/api/refresh", false), GuardDecision::Allow);
        // Prefix must be a whole segment
        assert_eq!(
            guard.classify("/apiary", false),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_auth_routes_allowed() {
        let guard = guard();
        for path in ["/login", "/register", "/auth/callback", "/login/"] {
            assert_eq!(guard.classify(path, false), GuardDecision::Allow, "{path}");
        }
        assert_eq!(guard.classify("/ping", false), GuardDecision::Allow);
    }

    #[test]
    fn test_static_assets_allowed() {
        let guard = guard();
        for path in [
            "/static/app.js",
            "/favicon.ico",
            "/robots.txt",
            "/assets/logo.SVG",
            "/fonts/inter.woff2",
        ] {
            assert_eq!(guard.classify(path, false), GuardDecision::Allow, "{path}");
        }
    }

    #[test]
    fn test_protected_page_requires_cookie() {
        let guard = guard();
        assert_eq!(
            guard.classify("/invoices", false),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(guard.classify("/invoices", true), GuardDecision::Allow);
        assert_eq!(guard.classify("/", false), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn test_custom_prefix() {
        let guard = RouteGuard::new("/backend/", vec!["/signin".into()], vec![], "/signin");
        assert_eq!(guard.classify("/backend/x", false), GuardDecision::Allow);
        assert_eq!(guard.classify("/signin", false), GuardDecision::Allow);
        assert_eq!(guard.classify("/login", false), GuardDecision::RedirectToLogin);
        assert_eq!(guard.login_path(), "/signin");
    }
}
