use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ChatConfig;

#[derive(Debug, Serialize)]
pub struct ChatPayload<'a> {
    pub username: &'a str,
    pub icon_url: &'a str,
    pub text: &'a str,
    pub channel: &'a str,
}

/// Posts notification messages to the configured chat webhook.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    config: ChatConfig,
}

impl Notifier {
    pub fn new(client: reqwest::Client, config: ChatConfig) -> Self {
        Self { client, config }
    }

    /// Send a notification. Transport failures are errors; a non-success
    /// response status is logged and otherwise ignored, the webhook is
    /// best-effort.
    pub async fn send(&self, text: &str) -> Result<()> {
        let payload = ChatPayload {
            username: &self.config.username,
            icon_url: &self.config.icon_url,
            text,
            channel: &self.config.channel,
        };
        debug!(channel = %self.config.channel, "posting chat notification");
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("post chat webhook")?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "chat webhook returned non-success status");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_the_webhook_wire_names() {
        let payload = ChatPayload {
            username: "Voicemail Bot",
            icon_url: "https://vm.example.com/icon.png",
            text: "New voice message from +1 <url>!",
            channel: "#voicemail",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "username": "Voicemail Bot",
                "icon_url": "https://vm.example.com/icon.png",
                "text": "New voice message from +1 <url>!",
                "channel": "#voicemail",
            })
        );
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_transport_error() {
        let config = ChatConfig {
            webhook_url: "http://127.0.0.1:1/hook".to_string(),
            username: "Voicemail Bot".to_string(),
            icon_url: String::new(),
            channel: "#voicemail".to_string(),
        };
        let notifier = Notifier::new(reqwest::Client::new(), config);
        assert!(notifier.send("hello").await.is_err());
    }
}
