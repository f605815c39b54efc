use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::settings::NotificationSettings;

/// Upper bound for one delivery attempt
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
}

/// Posts a chat message when a user logs in
///
/// Only built when both the bot token and the chat id are configured. A
/// failed notification is logged and otherwise ignored; it never changes the
/// outcome of the login.
#[derive(Clone)]
pub struct LoginNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl LoginNotifier {
    #[must_use]
    pub fn from_settings(settings: &NotificationSettings) -> Option<Self> {
        let bot_token = settings.bot_token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = settings.chat_id.as_deref().filter(|c| !c.is_empty())?;

        let client = Client::builder().timeout(NOTIFY_TIMEOUT).build().ok()?;

        Some(Self {
            client,
            endpoint: format!(
                "{}/bot{bot_token}/sendMessage",
                settings.api_base_url.trim_end_matches('/')
            ),
            chat_id: chat_id.to_string(),
        })
    }

    /// Deliver the login notice on a background task
    ///
    /// Returns immediately; the caller never waits on the chat endpoint.
    pub fn spawn_login_notice(&self, email: String) -> tokio::task::JoinHandle<()> {
        let notifier = self.clone();
        tokio::spawn(async move { notifier.notify_login(&email).await })
    }

    pub async fn notify_login(&self, email: &str) {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text: format!("User {email} logged in"),
        };

        match self.client.post(&self.endpoint).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Login notification delivered for {email}");
            }
            Ok(response) => {
                warn!(
                    "Login notification rejected with status {}",
                    response.status()
                );
            }
            // The endpoint embeds the bot token, so only the error kind is logged
            Err(e) => warn!(
                "Login notification failed (timeout={}, connect={})",
                e.is_timeout(),
                e.is_connect()
            ),
        }
    }
}
