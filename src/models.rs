use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::errors::AuthFlowError;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Email/password pair submitted once per login attempt
///
/// Never persisted. The `Debug` output masks the password so a credential can
/// appear in log statements without leaking it.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check that both fields carry a value
    ///
    /// # Errors
    ///
    /// Returns `AuthFlowError::Validation` if the email or the password is
    /// empty or whitespace-only
    pub fn validate(&self) -> Result<(), AuthFlowError> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(AuthFlowError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// User record the backend attaches to a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "name")]
    pub username: Option<String>,
}

/// Accept ids sent either as JSON numbers or strings
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Access/refresh pair issued by the backend
///
/// Only the refresh token ever leaves process memory, and only inside the
/// HTTP-only cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            issued_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token_len", &self.access_token.len())
            .field("refresh_token_len", &self.refresh_token.len())
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// A user object that does not parse is dropped; tokens alone decide success
fn lenient_user<'de, D>(deserializer: D) -> Result<Option<AuthenticatedUser>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        serde_json::from_value(value)
            .inspect_err(|e| log::debug!("Ignoring unreadable user object: {e}"))
            .ok()
    }))
}

// Backend wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Login response as the backend sends it; token presence is checked later
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendLoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(deserialize_with = "lenient_user")]
    pub user: Option<AuthenticatedUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendTokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendErrorBody {
    pub message: Option<BackendMessage>,
}

/// Backends built on validation pipes send either one message or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BackendMessage {
    Text(String),
    List(Vec<String>),
}

impl BackendMessage {
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::List(items) => items.join("; "),
        }
    }
}

// Local cookie endpoint wire types

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: Option<AuthenticatedUser>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetCookieRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// JSON body of every error returned by the local endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub status: u16,
}
