//! Remote REST backend
//!
//! The [`AuthBackend`] trait is the seam between the session flows and the
//! backend's `/auth` endpoints. [`HttpAuthBackend`] is the `reqwest`
//! implementation used in production; tests substitute an in-memory one.
//!
//! Implementations only transport: they report what the backend sent and map
//! non-2xx answers to [`AuthFlowError`]. Checking that a 2xx answer actually
//! carries both tokens is the caller's job.

mod http;

use async_trait::async_trait;

use crate::errors::AuthFlowError;
use crate::models::{BackendLoginResponse, BackendTokenResponse, Credential};

pub use http::HttpAuthBackend;

/// Login path relative to the backend base URL
pub const LOGIN_PATH: &str = "auth/user/login";
/// Refresh path relative to the backend base URL
pub const REFRESH_PATH: &str = "auth/refresh-token";

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange an email/password pair for a token pair
    ///
    /// # Errors
    ///
    /// Returns `AuthFlowError::Auth` when the backend rejects the credentials
    /// and `AuthFlowError::Backend` when it cannot be reached
    async fn login(&self, credential: &Credential) -> Result<BackendLoginResponse, AuthFlowError>;

    /// Exchange a refresh token for a rotated token pair
    ///
    /// # Errors
    ///
    /// Returns `AuthFlowError::RefreshRejected` when the backend refuses the
    /// token and `AuthFlowError::Backend` when it cannot be reached
    async fn refresh(&self, refresh_token: &str) -> Result<BackendTokenResponse, AuthFlowError>;
}
