//! Client side of the local cookie endpoints
//!
//! The browser half of the dashboard never sees the refresh token: it only
//! calls `/api/*` and lets the cookie jar carry the HTTP-only cookie back and
//! forth. [`HttpSessionEndpoints`] does the same with a cookie-storing
//! `reqwest` client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::AuthFlowError;
use crate::models::{Credential, ErrorBody, LoginResponse, RefreshResponse, SetCookieRequest};

const LOGIN_ENDPOINT: &str = "api/login";
const REFRESH_ENDPOINT: &str = "api/refresh";
const LOGOUT_ENDPOINT: &str = "api/logout";
const SET_COOKIE_ENDPOINT: &str = "api/set-cookie";

/// The four cookie endpoints as seen from a client
#[async_trait]
pub trait SessionEndpoints: Send + Sync {
    async fn login(&self, credential: &Credential) -> Result<LoginResponse, AuthFlowError>;

    /// Rotate the session using whatever refresh cookie the client holds
    async fn refresh(&self) -> Result<RefreshResponse, AuthFlowError>;

    async fn logout(&self) -> Result<(), AuthFlowError>;

    /// Store a refresh token obtained outside the cookie endpoints (OAuth)
    async fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), AuthFlowError>;
}

pub struct HttpSessionEndpoints {
    client: Client,
    base: Url,
}

impl HttpSessionEndpoints {
    /// Create endpoints rooted at the gateway's public URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute or the HTTP client cannot
    /// be built
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid gateway URL: {base_url}"))?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthFlowError> {
        self.base
            .join(path)
            .map_err(|e| AuthFlowError::Backend(format!("Invalid endpoint {path}: {e}")))
    }

    async fn post<B: serde::Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, AuthFlowError> {
        let url = self.endpoint(path)?;
        debug!("POST {url}");

        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AuthFlowError::Backend(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn body<T: DeserializeOwned>(response: Response) -> Result<T, AuthFlowError> {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthFlowError::Integrity(format!("Unreadable response: {e}")))
    }
}

/// Map a non-2xx answer back into the error the server rendered
async fn error_from_response(response: Response) -> AuthFlowError {
    let status = response.status().as_u16();
    match response.json::<ErrorBody>().await {
        Ok(body) => AuthFlowError::from_error_body(body),
        Err(_) => AuthFlowError::Backend(format!("Unexpected response status {status}")),
    }
}

#[async_trait]
impl SessionEndpoints for HttpSessionEndpoints {
    async fn login(&self, credential: &Credential) -> Result<LoginResponse, AuthFlowError> {
        let response = self.post(LOGIN_ENDPOINT, Some(credential)).await?;
        Self::body(response).await
    }

    async fn refresh(&self) -> Result<RefreshResponse, AuthFlowError> {
        let response = self.post::<()>(REFRESH_ENDPOINT, None).await?;
        Self::body(response).await
    }

    async fn logout(&self) -> Result<(), AuthFlowError> {
        self.post::<()>(LOGOUT_ENDPOINT, None).await.map(|_| ())
    }

    async fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), AuthFlowError> {
        let body = SetCookieRequest {
            refresh_token: Some(refresh_token.to_string()),
        };
        self.post(SET_COOKIE_ENDPOINT, Some(&body))
            .await
            .map(|_| ())
            .map_err(|e| AuthFlowError::SessionPersist {
                status: e.status().as_u16(),
                message: e.user_message(),
            })
    }
}
