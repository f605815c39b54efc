//! OAuth Callback Bridge
//!
//! When the identity provider sends the browser back to the callback route,
//! the backend has already minted both tokens and put them in the query
//! string. The bridge hands the refresh token to `/api/set-cookie`, keeps the
//! access token in memory and sends the user home.
//!
//! Callback pages can run twice for the same redirect (double mount, a
//! re-render racing the first run). Each token pair is claimed under an
//! idempotency key before the first await, so only one run persists it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::endpoints::SessionEndpoints;
use super::token_holder::AccessTokenHolder;
use crate::errors::AuthFlowError;

pub const LOGIN_SUCCESS_NOTICE: &str = "Login successful";
const DEFAULT_HOME_PATH: &str = "/";

/// Token parameters carried by the callback URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl CallbackParams {
    /// Parse `accessToken` and `refreshToken` out of a query string
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "accessToken" => params.access_token = Some(value.into_owned()),
                "refreshToken" => params.refresh_token = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    fn require(value: Option<&String>, field: &str) -> Result<String, AuthFlowError> {
        value
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| AuthFlowError::MissingToken {
                field: field.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Session established; navigate to `redirect_to` and show `notice` once
    Completed {
        redirect_to: String,
        notice: &'static str,
    },
    /// Another run already handled this token pair
    AlreadyHandled,
}

pub struct OAuthCallbackBridge {
    endpoints: Arc<dyn SessionEndpoints>,
    holder: AccessTokenHolder,
    claimed: Mutex<HashSet<String>>,
    home_path: String,
}

impl OAuthCallbackBridge {
    #[must_use]
    pub fn new(endpoints: Arc<dyn SessionEndpoints>, holder: AccessTokenHolder) -> Self {
        Self {
            endpoints,
            holder,
            claimed: Mutex::new(HashSet::new()),
            home_path: DEFAULT_HOME_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_home_path(mut self, home_path: impl Into<String>) -> Self {
        self.home_path = home_path.into();
        self
    }

    /// Idempotency key for a token pair: base64url(SHA-256(access || 0 || refresh))
    #[must_use]
    pub fn idempotency_key(access_token: &str, refresh_token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(access_token.as_bytes());
        hasher.update([0u8]);
        hasher.update(refresh_token.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Finish an OAuth login from the callback parameters
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either token parameter is missing or empty (`MissingToken`)
    /// - The refresh cookie could not be written (`SessionPersist`); the key
    ///   is released so the user can retry
    pub async fn complete(&self, params: &CallbackParams) -> Result<CallbackOutcome, AuthFlowError> {
        let access_token = CallbackParams::require(params.access_token.as_ref(), "accessToken")?;
        let refresh_token = CallbackParams::require(params.refresh_token.as_ref(), "refreshToken")?;

        let key = Self::idempotency_key(&access_token, &refresh_token);
        if !self.claim(&key) {
            debug!("OAuth callback already handled for this token pair");
            return Ok(CallbackOutcome::AlreadyHandled);
        }

        if let Err(err) = self.endpoints.persist_refresh_token(&refresh_token).await {
            warn!("Failed to persist OAuth session: {err}");
            self.release(&key);
            return Err(match err {
                persist @ AuthFlowError::SessionPersist { .. } => persist,
                other => AuthFlowError::SessionPersist {
                    status: other.status().as_u16(),
                    message: other.user_message(),
                },
            });
        }

        self.holder.set_access_token(access_token);
        info!("OAuth login completed");
        Ok(CallbackOutcome::Completed {
            redirect_to: self.home_path.clone(),
            notice: LOGIN_SUCCESS_NOTICE,
        })
    }

    fn claim(&self, key: &str) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string())
    }

    fn release(&self, key: &str) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
