//! Mock objects and fake implementations for testing
//!
//! [`MockAuthBackend`] stands in for the backend's auth endpoints with
//! single-use refresh tokens. [`LoopbackEndpoints`] connects the client half
//! straight to a [`SessionManager`], keeping the refresh cookie in a one-slot
//! jar the way a browser would.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::constants::{INVALID_CREDENTIALS_MESSAGE, REVOKED_REFRESH_MESSAGE, TEST_USER_NAME};
use crate::backend::AuthBackend;
use crate::client::SessionEndpoints;
use crate::errors::AuthFlowError;
use crate::models::{
    AuthenticatedUser, BackendLoginResponse, BackendTokenResponse, Credential, LoginResponse,
    RefreshResponse,
};
use crate::session::SessionManager;

/// In-memory backend issuing `AT<n>`/`RT<n>` token pairs
///
/// Every successful login or refresh bumps `n`. A refresh token is valid
/// exactly once: rotating it removes it from the valid set.
#[derive(Default)]
pub struct MockAuthBackend {
    users: HashMap<String, String>,
    valid_refresh_tokens: Mutex<HashSet<String>>,
    issued: AtomicUsize,
    malformed: bool,
    login_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl MockAuthBackend {
    #[must_use]
    pub fn with_user(email: &str, password: &str) -> Self {
        Self::default().and_user(email, password)
    }

    #[must_use]
    pub fn and_user(mut self, email: &str, password: &str) -> Self {
        self.users.insert(email.to_string(), password.to_string());
        self
    }

    /// Answer 2xx without any tokens
    #[must_use]
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    /// Mark a refresh token as valid without going through login
    pub fn accept_refresh_token(&self, refresh_token: &str) {
        self.tokens().insert(refresh_token.to_string());
    }

    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn tokens(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.valid_refresh_tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_pair(&self) -> (String, String) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let refresh_token = format!("RT{n}");
        self.tokens().insert(refresh_token.clone());
        (format!("AT{n}"), refresh_token)
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, credential: &Credential) -> Result<BackendLoginResponse, AuthFlowError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);

        if self.users.get(&credential.email) != Some(&credential.password) {
            return Err(AuthFlowError::Auth {
                status: 401,
                message: INVALID_CREDENTIALS_MESSAGE.to_string(),
            });
        }

        let user = Some(AuthenticatedUser {
            id: "1".to_string(),
            email: credential.email.clone(),
            username: Some(TEST_USER_NAME.to_string()),
        });
        if self.malformed {
            return Ok(BackendLoginResponse {
                access_token: None,
                refresh_token: None,
                user,
            });
        }

        let (access_token, refresh_token) = self.issue_pair();
        Ok(BackendLoginResponse {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            user,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<BackendTokenResponse, AuthFlowError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if self.malformed {
            return Ok(BackendTokenResponse {
                access_token: None,
                refresh_token: None,
            });
        }
        if !self.tokens().remove(refresh_token) {
            return Err(AuthFlowError::RefreshRejected {
                status: 401,
                message: REVOKED_REFRESH_MESSAGE.to_string(),
            });
        }

        let (access_token, refresh_token) = self.issue_pair();
        Ok(BackendTokenResponse {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        })
    }
}

/// Cookie endpoints served in-process by a [`SessionManager`]
pub struct LoopbackEndpoints {
    manager: SessionManager,
    cookie_jar: Mutex<Option<String>>,
    fail_next_persist: AtomicBool,
    login_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    persist_calls: AtomicUsize,
}

impl LoopbackEndpoints {
    #[must_use]
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager,
            cookie_jar: Mutex::new(None),
            fail_next_persist: AtomicBool::new(false),
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            persist_calls: AtomicUsize::new(0),
        }
    }

    /// Make the next `persist_refresh_token` call fail with a 502
    pub fn fail_next_persist(&self) {
        self.fail_next_persist.store(true, Ordering::SeqCst);
    }

    /// Refresh token currently held by the jar
    #[must_use]
    pub fn refresh_cookie(&self) -> Option<String> {
        self.jar().clone()
    }

    pub fn set_refresh_cookie(&self, value: Option<&str>) {
        *self.jar() = value.map(ToString::to_string);
    }

    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    fn jar(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.cookie_jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Same rule a browser applies: an empty or expired cookie is dropped
    fn store(&self, cookie: &actix_web::cookie::Cookie<'_>) {
        let expired = cookie
            .max_age()
            .is_some_and(|age| age <= actix_web::cookie::time::Duration::ZERO);
        *self.jar() = if cookie.value().is_empty() || expired {
            None
        } else {
            Some(cookie.value().to_string())
        };
    }
}

#[async_trait]
impl SessionEndpoints for LoopbackEndpoints {
    async fn login(&self, credential: &Credential) -> Result<LoginResponse, AuthFlowError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let issued = self.manager.login(credential.clone()).await?;
        self.store(&issued.refresh_cookie);
        Ok(issued.login_response())
    }

    async fn refresh(&self) -> Result<RefreshResponse, AuthFlowError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let current = self.refresh_cookie();
        match self.manager.refresh(current).await {
            Ok(issued) => {
                self.store(&issued.refresh_cookie);
                Ok(issued.refresh_response())
            }
            Err(err) => {
                if matches!(err, AuthFlowError::RefreshRejected { .. }) {
                    self.store(&self.manager.logout());
                }
                Err(err)
            }
        }
    }

    async fn logout(&self) -> Result<(), AuthFlowError> {
        tokio::task::yield_now().await;
        self.store(&self.manager.logout());
        Ok(())
    }

    async fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), AuthFlowError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_next_persist.swap(false, Ordering::SeqCst) {
            return Err(AuthFlowError::SessionPersist {
                status: 502,
                message: "Cookie endpoint unavailable".to_string(),
            });
        }

        let cookie = self
            .manager
            .persist_refresh_token(Some(refresh_token))
            .map_err(|e| AuthFlowError::SessionPersist {
                status: e.status().as_u16(),
                message: e.user_message(),
            })?;
        self.store(&cookie);
        Ok(())
    }
}
