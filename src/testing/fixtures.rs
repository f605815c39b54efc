//! Test fixtures providing pre-built test objects

use std::sync::Arc;

use crate::backend::AuthBackend;
use crate::guard::RouteGuard;
use crate::session::{RefreshCookieStore, SessionManager};
use crate::settings::DashgateSettings;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Default settings in the development environment (no `Secure` cookies)
    #[must_use]
    pub fn settings() -> DashgateSettings {
        DashgateSettings::default()
    }

    /// Default settings with the production environment selected
    #[must_use]
    pub fn production_settings() -> DashgateSettings {
        let mut settings = Self::settings();
        settings.application.environment = "production".to_string();
        settings
    }

    #[must_use]
    pub fn route_guard() -> RouteGuard {
        RouteGuard::from_settings(&Self::settings())
    }

    #[must_use]
    pub fn cookie_store() -> RefreshCookieStore {
        RefreshCookieStore::from_settings(&Self::settings())
    }

    /// Session manager over the given backend, without a login notifier
    #[must_use]
    pub fn session_manager<B: AuthBackend + 'static>(backend: Arc<B>) -> SessionManager {
        SessionManager::new(backend, Self::cookie_store())
    }
}
