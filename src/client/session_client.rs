//! Session Client - what the dashboard pages call
//!
//! Wraps the cookie endpoints with the access-token holder: a successful
//! login or refresh fills the holder, a refresh that needs a fresh login or a
//! logout empties it. One request at a time: a submission made while another
//! is outstanding fails with `SubmissionInProgress` instead of being sent.

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::endpoints::SessionEndpoints;
use super::token_holder::AccessTokenHolder;
use crate::errors::AuthFlowError;
use crate::models::{Credential, LoginResponse};

pub struct SessionClient {
    endpoints: Arc<dyn SessionEndpoints>,
    holder: AccessTokenHolder,
    in_flight: AtomicBool,
}

/// Releases the single-flight flag when the request finishes or is dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AuthFlowError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| AuthFlowError::SubmissionInProgress)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionClient {
    #[must_use]
    pub fn new(endpoints: Arc<dyn SessionEndpoints>, holder: AccessTokenHolder) -> Self {
        Self {
            endpoints,
            holder,
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn holder(&self) -> &AccessTokenHolder {
        &self.holder
    }

    /// Whether a request is currently outstanding
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// # Errors
    ///
    /// Returns `Validation` without any request when a field is empty,
    /// `SubmissionInProgress` when another request is outstanding, or the
    /// error reported by the login endpoint
    pub async fn login(&self, credential: Credential) -> Result<LoginResponse, AuthFlowError> {
        credential.validate()?;
        let _flight = InFlight::acquire(&self.in_flight)?;

        let response = self.endpoints.login(&credential).await?;
        self.holder.set_access_token(response.access_token.clone());
        info!("Signed in as {}", credential.email);
        Ok(response)
    }

    /// Obtain a new access token from the refresh cookie
    ///
    /// # Errors
    ///
    /// `NoRefreshToken` and `RefreshRejected` mean a login is required; the
    /// holder is emptied in both cases.
    pub async fn silent_refresh(&self) -> Result<String, AuthFlowError> {
        let _flight = InFlight::acquire(&self.in_flight)?;

        match self.endpoints.refresh().await {
            Ok(response) => {
                self.holder.set_access_token(response.access_token.clone());
                debug!("Silent refresh succeeded");
                Ok(response.access_token)
            }
            Err(err) => {
                if err.requires_login() {
                    self.holder.clear();
                }
                Err(err)
            }
        }
    }

    /// Current access token, refreshing silently when the holder is empty
    ///
    /// # Errors
    ///
    /// Same as [`Self::silent_refresh`]
    pub async fn access_token(&self) -> Result<String, AuthFlowError> {
        match self.holder.access_token() {
            Some(token) => Ok(token),
            None => self.silent_refresh().await,
        }
    }

    /// End the session; the holder is emptied even when the request fails
    ///
    /// # Errors
    ///
    /// Returns the error reported by the logout endpoint
    pub async fn logout(&self) -> Result<(), AuthFlowError> {
        let _flight = InFlight::acquire(&self.in_flight)?;
        let result = self.endpoints.logout().await;
        self.holder.reset();
        info!("Signed out");
        result
    }

    /// Forget the in-memory token, as a page reload does
    pub fn reload(&self) {
        self.holder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock::{LoopbackEndpoints, MockAuthBackend};
    use crate::testing::TestFixtures;

    fn client_for(backend: MockAuthBackend) -> (SessionClient, Arc<LoopbackEndpoints>) {
        let manager = TestFixtures::session_manager(Arc::new(backend));
        let endpoints = Arc::new(LoopbackEndpoints::new(manager));
        let client = SessionClient::new(endpoints.clone(), AccessTokenHolder::new());
        (client, endpoints)
    }

    #[tokio::test]
    async fn test_login_fills_holder() {
        let (client, _) = client_for(MockAuthBackend::with_user("a@b.com", "secret"));
        let response = client
            .login(Credential::new("a@b.com", "secret"))
            .await
            .unwrap();
        assert_eq!(response.access_token, "AT1");
        assert_eq!(client.holder().access_token().as_deref(), Some("AT1"));
        assert!(!client.is_loading());
    }

    #[tokio::test]
    async fn test_login_validation_sends_nothing() {
        let (client, endpoints) = client_for(MockAuthBackend::with_user("a@b.com", "secret"));
        let err = client.login(Credential::new(" ", "secret")).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::Validation(_)));
        assert_eq!(endpoints.login_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_without_cookie_requires_login() {
        let (client, _) = client_for(MockAuthBackend::default());
        client.holder().set_access_token("stale");

        let err = client.silent_refresh().await.unwrap_err();
        assert_eq!(err, AuthFlowError::NoRefreshToken);
        assert!(!client.holder().has_token());
    }

    #[tokio::test]
    async fn test_access_token_prefers_holder() {
        let (client, endpoints) = client_for(MockAuthBackend::with_user("a@b.com", "secret"));
        client
            .login(Credential::new("a@b.com", "secret"))
            .await
            .unwrap();

        assert_eq!(client.access_token().await.unwrap(), "AT1");
        assert_eq!(endpoints.refresh_calls(), 0);

        client.reload();
        assert_eq!(client.access_token().await.unwrap(), "AT2");
        assert_eq!(endpoints.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_empties_holder() {
        let (client, endpoints) = client_for(MockAuthBackend::with_user("a@b.com", "secret"));
        client
            .login(Credential::new("a@b.com", "secret"))
            .await
            .unwrap();

        client.logout().await.unwrap();
        assert!(!client.holder().has_token());
        assert_eq!(endpoints.refresh_cookie(), None);
    }

    #[test]
    fn test_in_flight_flag_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = InFlight::acquire(&flag).unwrap();
        assert!(matches!(
            InFlight::acquire(&flag),
            Err(AuthFlowError::SubmissionInProgress)
        ));
        drop(first);
        assert!(InFlight::acquire(&flag).is_ok());
    }
}
