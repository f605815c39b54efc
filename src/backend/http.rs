use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::{AuthBackend, LOGIN_PATH, REFRESH_PATH};
use crate::errors::AuthFlowError;
use crate::models::{
    BackendErrorBody, BackendLoginResponse, BackendMessage, BackendRefreshRequest,
    BackendTokenResponse, Credential,
};
use crate::settings::DashgateSettings;

/// `reqwest` client for the backend's auth endpoints
///
/// No retries and no custom deadline: each call is a single attempt with the
/// client's default timeout.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: Client,
    login_url: Url,
    refresh_url: Url,
}

impl HttpAuthBackend {
    /// Create a backend client rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// # Errors
    ///
    /// Returns an error if the configured backend URL is not an absolute URL
    pub fn from_settings(settings: &DashgateSettings) -> Result<Self> {
        Self::new(&settings.backend.base_url)
    }

    /// Create a backend client with a caller-supplied `reqwest::Client`
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        // A trailing slash keeps any path prefix of the base URL when joining
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid backend URL: {base_url}"))?;

        Ok(Self {
            client,
            login_url: base.join(LOGIN_PATH)?,
            refresh_url: base.join(REFRESH_PATH)?,
        })
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    #[must_use]
    pub fn refresh_url(&self) -> &Url {
        &self.refresh_url
    }

    /// Pull the backend's `message` out of an error response
    async fn error_message(response: reqwest::Response, fallback: &str) -> String {
        response
            .json::<BackendErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .map(BackendMessage::into_text)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    async fn success_body<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T, AuthFlowError> {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthFlowError::Integrity(format!("Unreadable {operation} response: {e}")))
    }
}

fn transport_error(err: &reqwest::Error) -> AuthFlowError {
    AuthFlowError::Backend(err.to_string())
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credential: &Credential) -> Result<BackendLoginResponse, AuthFlowError> {
        debug!("POST {}", self.login_url);
        let response = self
            .client
            .post(self.login_url.clone())
            .json(credential)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Login failed").await;
            return Err(AuthFlowError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        Self::success_body(response, "login").await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<BackendTokenResponse, AuthFlowError> {
        debug!("POST {}", self.refresh_url);
        let response = self
            .client
            .post(self.refresh_url.clone())
            .json(&BackendRefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Session expired, please log in again").await;
            return Err(AuthFlowError::RefreshRejected {
                status: status.as_u16(),
                message,
            });
        }

        Self::success_body(response, "refresh").await
    }
}
