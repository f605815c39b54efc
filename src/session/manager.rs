//! Session Manager - server side of the session lifecycle
//!
//! The `SessionManager` is the single place where sessions are created,
//! rotated and destroyed. It delegates transport to an [`AuthBackend`] and
//! cookie construction to the [`RefreshCookieStore`]; handlers only attach
//! the cookies it returns.
//!
//! ## Organization
//!
//! 1. **Types** - result of issuing a session
//! 2. **Construction** - manager creation and optional notifier
//! 3. **Credential Exchange** - email/password login
//! 4. **Silent Refresh** - refresh-token rotation
//! 5. **Persistence & Logout** - OAuth cookie write and cookie deletion
//! 6. **Tests**

use actix_web::cookie::Cookie;
use std::sync::Arc;

use crate::backend::AuthBackend;
use crate::errors::AuthFlowError;
use crate::models::{AuthenticatedUser, Credential, LoginResponse, RefreshResponse, Session};
use crate::session::cookie::RefreshCookieStore;
use crate::session::notifier::LoginNotifier;
use crate::utils::logging::LoggingHelper;

// =============================================================================
// Types
// =============================================================================

/// A session freshly issued by the backend, plus the cookie that persists it
#[derive(Debug)]
pub struct IssuedSession {
    pub session: Session,
    pub user: Option<AuthenticatedUser>,
    pub refresh_cookie: Cookie<'static>,
}

impl IssuedSession {
    #[must_use]
    pub fn login_response(&self) -> LoginResponse {
        LoginResponse {
            access_token: self.session.access_token.clone(),
            user: self.user.clone(),
            issued_at: self.session.issued_at,
        }
    }

    #[must_use]
    pub fn refresh_response(&self) -> RefreshResponse {
        RefreshResponse {
            access_token: self.session.access_token.clone(),
            issued_at: self.session.issued_at,
        }
    }
}

/// Require a non-empty token from a 2xx backend answer
fn require_token(
    value: Option<String>,
    field: &str,
    operation: &str,
) -> Result<String, AuthFlowError> {
    match value {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            let detail = format!("{field} missing from {operation} response");
            LoggingHelper::log_contract_violation(operation, &detail);
            Err(AuthFlowError::Integrity(detail))
        }
    }
}

// =============================================================================
// 1. Construction
// =============================================================================

#[derive(Clone)]
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    cookie_store: RefreshCookieStore,
    notifier: Option<LoginNotifier>,
}

impl SessionManager {
    #[must_use]
    pub fn new(backend: Arc<dyn AuthBackend>, cookie_store: RefreshCookieStore) -> Self {
        Self {
            backend,
            cookie_store,
            notifier: None,
        }
    }

    /// Announce successful logins through the given notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Option<LoginNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn cookie_store(&self) -> &RefreshCookieStore {
        &self.cookie_store
    }
}

// =============================================================================
// 2. Credential Exchange
// =============================================================================

impl SessionManager {
    /// Log in with an email/password pair
    ///
    /// One backend attempt per call. On success the returned session carries
    /// the refresh cookie to attach to the response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email or password is missing (`Validation`, no backend call)
    /// - The backend rejects the credentials (`Auth`)
    /// - The backend answers 2xx without both tokens (`Integrity`)
    /// - The backend cannot be reached (`Backend`)
    pub async fn login(&self, credential: Credential) -> Result<IssuedSession, AuthFlowError> {
        credential.validate()?;
        LoggingHelper::log_login_attempt(&credential.email);

        let response = self.backend.login(&credential).await.inspect_err(|e| {
            if let AuthFlowError::Auth { status, .. } = e {
                LoggingHelper::log_login_rejected(&credential.email, *status);
            }
        })?;

        let access_token = require_token(response.access_token, "accessToken", "login")?;
        let refresh_token = require_token(response.refresh_token, "refreshToken", "login")?;
        let session = Session::new(access_token, refresh_token);
        let refresh_cookie = self.cookie_store.set(&session.refresh_token);

        LoggingHelper::log_login_success(&credential.email, &session.access_token);
        if let Some(notifier) = &self.notifier {
            notifier.spawn_login_notice(credential.email.clone());
        }

        Ok(IssuedSession {
            session,
            user: response.user,
            refresh_cookie,
        })
    }
}

// =============================================================================
// 3. Silent Refresh
// =============================================================================

impl SessionManager {
    /// Rotate the refresh token read from the request cookie
    ///
    /// Refresh tokens are single use: once this succeeds, `refresh_token` is
    /// no longer valid at the backend and only the returned cookie is.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No refresh token is present (`NoRefreshToken`, no backend call)
    /// - The backend refuses the token (`RefreshRejected`)
    /// - The backend answers 2xx without both tokens (`Integrity`)
    /// - The backend cannot be reached (`Backend`)
    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<IssuedSession, AuthFlowError> {
        let current = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthFlowError::NoRefreshToken)?;

        let response = self.backend.refresh(&current).await.inspect_err(|e| {
            if let AuthFlowError::RefreshRejected { status, .. } = e {
                LoggingHelper::log_refresh_rejected(*status);
            }
        })?;

        let access_token = require_token(response.access_token, "accessToken", "refresh")?;
        let refresh_token = require_token(response.refresh_token, "refreshToken", "refresh")?;
        let session = Session::new(access_token, refresh_token);

        // The rotated cookie must be in hand before the access token goes out
        let refresh_cookie = self.cookie_store.set(&session.refresh_token);
        LoggingHelper::log_refresh_rotated(&session.access_token, &session.refresh_token);

        Ok(IssuedSession {
            session,
            user: None,
            refresh_cookie,
        })
    }
}

// =============================================================================
// 4. Persistence & Logout
// =============================================================================

impl SessionManager {
    /// Cookie persisting a refresh token obtained through the OAuth callback
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` if the token is absent or empty
    pub fn persist_refresh_token(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<Cookie<'static>, AuthFlowError> {
        let token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthFlowError::MissingToken {
                field: "refreshToken".to_string(),
            })?;

        Ok(self.cookie_store.set(token))
    }

    /// Cookie that ends the session; the backend is not contacted
    #[must_use]
    pub fn logout(&self) -> Cookie<'static> {
        self.cookie_store.clear()
    }
}

// =============================================================================
// Tests
// =============================================================================
