use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::session::cookie::{DEFAULT_REFRESH_COOKIE_NAME, REFRESH_COOKIE_MAX_AGE_DAYS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashgateSettings {
    pub application: ApplicationSettings,
    pub backend: BackendSettings,
    pub cookies: CookieSettings,
    pub guard: GuardSettings,
    pub static_files: StaticFilesSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    /// `production` turns on the `Secure` cookie attribute; anything else is development
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub refresh_cookie_name: String,
    pub max_age_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    pub login_path: String,
    pub api_prefix: String,
    /// Paths reachable without a session (login, registration, OAuth callback)
    pub auth_routes: Vec<String>,
    /// Path prefixes of public static assets
    pub public_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesSettings {
    pub assets_folder: String,
}

/// Optional chat-bot side channel announcing successful logins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: "http://localhost:3000".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            refresh_cookie_name: DEFAULT_REFRESH_COOKIE_NAME.to_string(),
            max_age_days: REFRESH_COOKIE_MAX_AGE_DAYS,
        }
    }
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            api_prefix: "/api".to_string(),
            auth_routes: vec![
                "/login".to_string(),
                "/register".to_string(),
                "/auth/callback".to_string(),
            ],
            public_prefixes: vec![
                "/static/".to_string(),
                "/favicon.ico".to_string(),
                "/robots.txt".to_string(),
            ],
        }
    }
}

impl Default for StaticFilesSettings {
    fn default() -> Self {
        Self {
            assets_folder: "static".to_string(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DashgateSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::initialize_environment()?;

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Load `.env` and initialize logging
    ///
    /// # Errors
    ///
    /// Returns an error if logger initialization fails
    fn initialize_environment() -> Result<()> {
        Self::load_env_file();
        env_logger::try_init().context("Failed to initialize logger")?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `DASHGATE_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed
    fn load_base_settings() -> Result<Self> {
        let mut settings = Self::load_file(Path::new("Settings.toml"))?.unwrap_or_default();

        if let Ok(secrets_dir) = std::env::var("DASHGATE_SECRETS_DIR") {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            match Self::load_file(&secrets_path)? {
                Some(secrets_settings) => settings = secrets_settings,
                None => log::info!(
                    "DASHGATE_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                ),
            }
        }

        Ok(settings)
    }

    /// Parse a settings file, returning `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = basic_toml::from_str(&toml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::info!("✓ Loaded settings from {}", path.display());

        Ok(Some(settings))
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_backend_env_overrides(&mut settings.backend);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_static_files_env_overrides(&mut settings.static_files);
        Self::apply_notification_env_overrides(&mut settings.notifications);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
        if let Ok(environment) = std::env::var("APP_ENV") {
            app_settings.environment = environment;
        }
    }

    fn apply_backend_env_overrides(backend_settings: &mut BackendSettings) {
        if let Ok(base_url) = std::env::var("BACKEND_URL") {
            backend_settings.base_url = base_url;
        }
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(name) = std::env::var("REFRESH_COOKIE_NAME") {
            if !name.trim().is_empty() {
                cookie_settings.refresh_cookie_name = name.trim().to_string();
            }
        }
    }

    fn apply_static_files_env_overrides(static_settings: &mut StaticFilesSettings) {
        if let Ok(assets_folder) = std::env::var("STATIC_FOLDER_PATH") {
            static_settings.assets_folder = assets_folder;
        }
    }

    fn apply_notification_env_overrides(notification_settings: &mut NotificationSettings) {
        if let Ok(bot_token) = std::env::var("LOGIN_NOTIFY_BOT_TOKEN") {
            notification_settings.bot_token = Some(bot_token);
        }
        if let Ok(chat_id) = std::env::var("LOGIN_NOTIFY_CHAT_ID") {
            notification_settings.chat_id = Some(chat_id);
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    if std::env::var_os(key.trim()).is_none() {
                        std::env::set_var(key.trim(), value.trim());
                    }
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(
            self.application.environment.trim().to_ascii_lowercase().as_str(),
            "production" | "prod"
        )
    }

    /// Refresh cookies carry `Secure` only outside local development
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = DashgateSettings::default();
        assert_eq!(settings.cookies.refresh_cookie_name, "refresh");
        assert_eq!(settings.cookies.max_age_days, 7);
        assert_eq!(settings.guard.login_path, "/login");
        assert!(!settings.cookie_secure());
        assert_eq!(settings.get_bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_production_flag_controls_secure() {
        let mut settings = DashgateSettings::default();
        settings.application.environment = "Production".to_string();
        assert!(settings.cookie_secure());

        settings.application.environment = "staging".to_string();
        assert!(!settings.cookie_secure());
    }

    #[test]
    fn test_cors_origins_split() {
        let mut settings = DashgateSettings::default();
        settings.application.cors_origins = "http://a.test, http://b.test,".to_string();
        assert_eq!(
            settings.get_cors_origins(),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_load_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"https://api.example.com\"\n\n[cookies]\nrefresh_cookie_name = \"rt\""
        )
        .unwrap();

        let settings = DashgateSettings::load_file(file.path()).unwrap().unwrap();
        assert_eq!(settings.backend.base_url, "https://api.example.com");
        assert_eq!(settings.cookies.refresh_cookie_name, "rt");
        assert_eq!(settings.cookies.max_age_days, 7);
        assert_eq!(settings.application.port, 3000);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = DashgateSettings::load_file(&dir.path().join("Settings.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nbase_url = ").unwrap();
        assert!(DashgateSettings::load_file(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_take_precedence() {
        std::env::set_var("BACKEND_URL", "https://backend.internal");
        std::env::set_var("REFRESH_COOKIE_NAME", "session_refresh");
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("PORT", "8081");

        let mut settings = DashgateSettings::default();
        DashgateSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.backend.base_url, "https://backend.internal");
        assert_eq!(settings.cookies.refresh_cookie_name, "session_refresh");
        assert!(settings.cookie_secure());
        assert_eq!(settings.application.port, 8081);

        std::env::remove_var("BACKEND_URL");
        std::env::remove_var("REFRESH_COOKIE_NAME");
        std::env::remove_var("APP_ENV");
        std::env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_blank_cookie_name_override_is_ignored() {
        std::env::set_var("REFRESH_COOKIE_NAME", "  ");

        let mut settings = DashgateSettings::default();
        DashgateSettings::apply_env_overrides(&mut settings);
        assert_eq!(settings.cookies.refresh_cookie_name, "refresh");

        std::env::remove_var("REFRESH_COOKIE_NAME");
    }

    #[test]
    #[serial]
    fn test_notification_env_overrides() {
        std::env::set_var("LOGIN_NOTIFY_BOT_TOKEN", "bot-token");
        std::env::set_var("LOGIN_NOTIFY_CHAT_ID", "-1001");

        let mut settings = DashgateSettings::default();
        DashgateSettings::apply_env_overrides(&mut settings);
        assert_eq!(settings.notifications.bot_token.as_deref(), Some("bot-token"));
        assert_eq!(settings.notifications.chat_id.as_deref(), Some("-1001"));

        std::env::remove_var("LOGIN_NOTIFY_BOT_TOKEN");
        std::env::remove_var("LOGIN_NOTIFY_CHAT_ID");
    }
}
