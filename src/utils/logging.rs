// Centralized logging helpers; tokens are only ever logged by length
use log::{debug, error, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Describe a token without revealing it
    #[must_use]
    pub fn token_summary(token: Option<&str>) -> String {
        match token {
            Some(value) if !value.is_empty() => format!("present ({} chars)", value.len()),
            _ => "missing".to_string(),
        }
    }

    pub fn log_login_attempt(email: &str) {
        info!("🔐 Login attempt for {email}");
    }

    pub fn log_login_success(email: &str, access_token: &str) {
        info!(
            "✅ Login succeeded for {email}: access token {}",
            Self::token_summary(Some(access_token))
        );
    }

    pub fn log_login_rejected(email: &str, status: u16) {
        warn!("❌ Backend rejected login for {email} with status {status}");
    }

    pub fn log_refresh_rotated(access_token: &str, refresh_token: &str) {
        info!(
            "🔄 Refresh token rotated: access token {}, refresh token {}",
            Self::token_summary(Some(access_token)),
            Self::token_summary(Some(refresh_token))
        );
    }

    pub fn log_refresh_rejected(status: u16) {
        warn!("⛔ Backend rejected refresh token with status {status}; full login required");
    }

    pub fn log_contract_violation(operation: &str, detail: &str) {
        error!("💥 Backend contract violation during {operation}: {detail}");
    }

    pub fn log_cookie_issued(name: &str, secure: bool) {
        debug!("Issuing refresh cookie '{name}' (secure={secure})");
    }

    pub fn log_cookie_cleared(name: &str) {
        info!("🧹 Cleared refresh cookie '{name}'");
    }

    pub fn log_guard_redirect(path: &str, login_path: &str) {
        debug!("Route guard: no refresh cookie for {path}, redirecting to {login_path}");
    }
}
