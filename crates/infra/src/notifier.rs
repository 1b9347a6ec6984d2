//! Outbound chat notification for new submissions
//!
//! Each accepted submission is posted to a chat room webhook so moderators
//! notice it. Delivery is best-effort: [`SubmissionNotifier::notify`] logs
//! failures and never returns them.

use plugdir_core::config::NotifyConfig;
use plugdir_core::types::SubmittedPlugin;
use plugdir_core::{PlugdirError, Result};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Notifier configuration
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub webhook_url: Url,
    pub token: Option<String>,
    pub room_id: Option<String>,
    pub sender: String,
    pub timeout: Duration,
}

impl NotifierConfig {
    pub fn new(webhook_url: Url) -> Self {
        let defaults = NotifyConfig::default();
        Self {
            webhook_url,
            token: None,
            room_id: None,
            sender: defaults.sender,
            timeout: Duration::from_secs(defaults.timeout_seconds),
        }
    }

    /// Build from the `notify` configuration section
    ///
    /// Returns `None` when no webhook URL is configured.
    pub fn from_settings(settings: &NotifyConfig) -> Option<Self> {
        let webhook_url = settings.webhook_url.clone()?;
        Some(Self {
            webhook_url,
            token: settings.token.clone(),
            room_id: settings.room_id.clone(),
            sender: settings.sender.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        })
    }
}

/// Message body accepted by the chat webhook
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    notify: bool,
    color: &'static str,
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_id: Option<&'a str>,
    message: String,
    message_format: &'static str,
}

/// Posts submission announcements to a chat webhook
#[derive(Debug, Clone)]
pub struct SubmissionNotifier {
    config: NotifierConfig,
    client: reqwest::Client,
}

impl SubmissionNotifier {
    /// Create a notifier whose requests time out after `config.timeout`
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlugdirError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Send one announcement for `submission`
    ///
    /// # Errors
    ///
    /// Returns `PlugdirError::Timeout` when the webhook does not answer in
    /// time and `PlugdirError::Network` for any other transport failure or
    /// a non-success status
    pub async fn send(&self, submission: &SubmittedPlugin) -> Result<()> {
        let body = ChatMessage {
            notify: false,
            color: "green",
            from: &self.config.sender,
            room_id: self.config.room_id.as_deref(),
            message: format!(
                "Someone just submitted a plugin!\n{}",
                serde_json::to_string_pretty(submission)?
            ),
            message_format: "text",
        };

        let mut request = self.client.post(self.config.webhook_url.clone()).json(&body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PlugdirError::timeout("submission notification")
            } else {
                PlugdirError::network(format!("Failed to send notification: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(PlugdirError::network(format!(
                "Notification webhook returned error: {}",
                response.status()
            )));
        }

        tracing::debug!("Sent notification for submission {}", submission.id);
        Ok(())
    }

    /// Send an announcement, logging instead of returning any failure
    pub async fn notify(&self, submission: &SubmittedPlugin) {
        if let Err(e) = self.send(submission).await {
            tracing::error!(
                category = %e.category(),
                "Failed to notify about submission {}: {}",
                submission.id,
                e
            );
        }
    }
}
