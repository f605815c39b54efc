//! Error taxonomy for the session flows
//!
//! Every failure a login, refresh, logout or OAuth completion can produce is a
//! variant of [`AuthFlowError`]. The same enum is used on both sides of the
//! cookie endpoints: the server renders it as a JSON body through
//! [`ResponseError`], and the client half maps that body back with
//! [`AuthFlowError::from_error_body`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;
use crate::utils::responses::ResponseBuilder;

/// Message shown to the user when the backend breaks its response contract
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Session flow errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFlowError {
    /// Missing or empty input; the user can correct it
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the credentials
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// No refresh cookie is present (never authenticated, or logged out)
    #[error("No refresh token present")]
    NoRefreshToken,

    /// The backend refused the refresh token; a full login is required
    #[error("{message}")]
    RefreshRejected { status: u16, message: String },

    /// The backend answered 2xx without the tokens it promised
    #[error("Backend contract violation: {0}")]
    Integrity(String),

    /// Writing the refresh cookie through the local endpoint failed
    #[error("Failed to persist session: {message}")]
    SessionPersist { status: u16, message: String },

    /// An OAuth callback arrived without one of its token parameters
    #[error("Missing {field} in callback parameters")]
    MissingToken { field: String },

    /// The backend could not be reached
    #[error("Backend unavailable: {0}")]
    Backend(String),

    /// Another session request from the same client is still outstanding
    #[error("A session request is already in progress")]
    SubmissionInProgress,
}

impl AuthFlowError {
    /// Stable machine-readable code carried in the `error` field of responses
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Auth { .. } => "auth_error",
            Self::NoRefreshToken => "no_refresh_token",
            Self::RefreshRejected { .. } => "refresh_rejected",
            Self::Integrity(_) => "integrity_error",
            Self::SessionPersist { .. } => "session_persist_error",
            Self::MissingToken { .. } => "missing_token",
            Self::Backend(_) => "backend_unavailable",
            Self::SubmissionInProgress => "submission_in_progress",
        }
    }

    /// HTTP status this error is surfaced with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MissingToken { .. } => StatusCode::BAD_REQUEST,
            Self::NoRefreshToken => StatusCode::UNAUTHORIZED,
            Self::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::SubmissionInProgress => StatusCode::CONFLICT,
            Self::Auth { status, .. }
            | Self::RefreshRejected { status, .. }
            | Self::SessionPersist { status, .. } => mirrored_status(*status),
        }
    }

    /// Message that is safe to show to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Integrity(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// True when the only way forward is a fresh interactive login
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::NoRefreshToken | Self::RefreshRejected { .. })
    }

    /// Rebuild an error from the JSON body a cookie endpoint returned
    #[must_use]
    pub fn from_error_body(body: ErrorBody) -> Self {
        let ErrorBody {
            error,
            message,
            status,
        } = body;

        match error.as_str() {
            "validation_error" => Self::Validation(message),
            "auth_error" => Self::Auth { status, message },
            "no_refresh_token" => Self::NoRefreshToken,
            "refresh_rejected" => Self::RefreshRejected { status, message },
            "integrity_error" => Self::Integrity(message),
            "session_persist_error" => Self::SessionPersist { status, message },
            "missing_token" => Self::MissingToken {
                field: missing_token_field(&message),
            },
            "submission_in_progress" => Self::SubmissionInProgress,
            _ => Self::Backend(message),
        }
    }

    /// Serializable body for this error
    #[must_use]
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind().to_string(),
            message: self.user_message(),
            status: self.status().as_u16(),
        }
    }
}

/// Recover the field name from a rendered `MissingToken` message
fn missing_token_field(message: &str) -> String {
    message
        .strip_prefix("Missing ")
        .and_then(|rest| rest.strip_suffix(" in callback parameters"))
        .filter(|field| !field.is_empty())
        .unwrap_or("token")
        .to_string()
}

/// Mirror a backend status, clamping anything that is not a 4xx/5xx to 502
fn mirrored_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|code| code.is_client_error() || code.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl ResponseError for AuthFlowError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        ResponseBuilder::error(self.status())
            .with_error_code(self.kind())
            .with_message(&self.user_message())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthFlowError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthFlowError::NoRefreshToken.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFlowError::Integrity("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthFlowError::Auth {
                status: 403,
                message: "nope".into()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_mirrored_status_is_clamped() {
        let err = AuthFlowError::RefreshRejected {
            status: 200,
            message: "odd".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err = AuthFlowError::RefreshRejected {
            status: 42,
            message: "odd".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_integrity_message_is_generic() {
        let err = AuthFlowError::Integrity("accessToken missing".into());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(err.to_string().contains("accessToken missing"));
    }

    #[test]
    fn test_error_body_maps_back() {
        let original = AuthFlowError::RefreshRejected {
            status: 401,
            message: "Refresh token revoked".into(),
        };
        let restored = AuthFlowError::from_error_body(original.to_error_body());
        assert_eq!(restored, original);

        let restored = AuthFlowError::from_error_body(AuthFlowError::NoRefreshToken.to_error_body());
        assert_eq!(restored, AuthFlowError::NoRefreshToken);
    }

    #[test]
    fn test_missing_token_body_maps_back() {
        let original = AuthFlowError::MissingToken {
            field: "refreshToken".into(),
        };
        let body = original.to_error_body();
        assert_eq!(body.error, "missing_token");
        assert_eq!(body.status, 400);
        assert_eq!(AuthFlowError::from_error_body(body), original);

        let restored = AuthFlowError::from_error_body(ErrorBody {
            error: "missing_token".into(),
            message: "token required".into(),
            status: 400,
        });
        assert_eq!(
            restored,
            AuthFlowError::MissingToken {
                field: "token".into()
            }
        );
    }

    #[test]
    fn test_requires_login() {
        assert!(AuthFlowError::NoRefreshToken.requires_login());
        assert!(!AuthFlowError::Validation("x".into()).requires_login());
    }

    #[test]
    fn test_error_response_status() {
        let response = AuthFlowError::Auth {
            status: 401,
            message: "Invalid credentials".into(),
        }
        .error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
