//! HTTP response handling
//!
//! Small fluent builders shared by the cookie endpoints, the route guard and
//! the error type, so every JSON error has the same `{error, message, status}`
//! shape and every redirect carries its cookies the same way.

use actix_web::{
    cookie::Cookie,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;

use crate::models::SuccessResponse;

/// Unified response builder
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create an error response with the given status
    #[must_use]
    pub fn error(status: StatusCode) -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(status)
    }

    /// Create a `NotFound` (404) error response
    #[must_use]
    pub fn not_found() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::NOT_FOUND)
    }

    /// Create a redirect response (302 Found)
    #[must_use]
    pub fn redirect(location: &str) -> RedirectBuilder {
        RedirectBuilder::new(location)
    }

    /// `{"success": true}` with the given cookies attached
    #[must_use]
    pub fn success_with_cookies(cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder.json(SuccessResponse { success: true })
    }
}

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    status: StatusCode,
    error_code: Option<String>,
    message: Option<String>,
}

impl ErrorResponseBuilder {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            error_code: None,
            message: None,
        }
    }

    /// Set a custom error code (e.g., "`auth_error`", "`missing_token`")
    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    /// Set a custom error message
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Build the final `HttpResponse`
    #[must_use]
    pub fn build(self) -> HttpResponse {
        let error_code = self
            .error_code
            .clone()
            .unwrap_or_else(|| self.default_error_code().to_string());
        let message = self.message.clone().unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        let json_body = json!({
            "error": error_code,
            "message": message,
            "status": self.status.as_u16(),
        });

        HttpResponse::build(self.status)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(json_body)
    }

    fn default_error_code(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST => "invalid_request",
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::BAD_GATEWAY => "bad_gateway",
            _ => "server_error",
        }
    }
}

/// Builder for redirect responses
pub struct RedirectBuilder {
    location: String,
    cookies: Vec<Cookie<'static>>,
}

impl RedirectBuilder {
    fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            cookies: Vec::new(),
        }
    }

    /// Attach a cookie to the redirect
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        for cookie in self.cookies {
            builder.cookie(cookie);
        }
        builder
            .append_header((header::LOCATION, self.location))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::Value;

    #[actix_web::test]
    async fn test_error_builder_shape() {
        let response = ResponseBuilder::error(StatusCode::UNAUTHORIZED)
            .with_error_code("auth_error")
            .with_message("Invalid credentials")
            .build();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "auth_error");
        assert_eq!(body["message"], "Invalid credentials");
        assert_eq!(body["status"], 401);
    }

    #[actix_web::test]
    async fn test_error_builder_defaults() {
        let response = ResponseBuilder::not_found().build();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Not Found");
    }

    #[test]
    fn test_redirect_builder() {
        let response = ResponseBuilder::redirect("/login")
            .with_cookie(Cookie::new("refresh", ""))
            .build();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
        assert_eq!(response.cookies().count(), 1);
    }
}
