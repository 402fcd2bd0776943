//! WhatsApp Business Cloud API channel.
//!
//! Uses the official WhatsApp Business Platform (Cloud API) for messaging.
//! Requires: Access Token + Phone Number ID from Meta Business Suite.
//! Recipients are canonical addresses (country code + number, digits only).

use std::time::Duration;

use async_trait::async_trait;
use wishbot_core::config::WhatsAppChannelConfig;
use wishbot_core::error::{Result, WishbotError};
use wishbot_core::traits::Channel;

/// Upper bound for a single HTTP call to the Graph API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// WhatsApp Business channel implementation.
pub struct WhatsAppChannel {
    config: WhatsAppChannelConfig,
    client: reqwest::Client,
    connected: bool,
}

impl WhatsAppChannel {
    pub fn new(config: WhatsAppChannelConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            connected: false,
        }
    }

    fn api_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.phone_number_id,
            suffix
        )
    }

    /// Send a text message via WhatsApp Cloud API. Returns the message id.
    async fn send_text_message(&self, to: &str, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": text
            }
        });

        let response = self
            .client
            .post(self.api_url("/messages"))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| WishbotError::Channel(format!("WhatsApp API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(WishbotError::Channel(format!(
                "WhatsApp API error {status}: {error_text}"
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WishbotError::Channel(format!("Invalid WhatsApp response: {e}")))?;

        let msg_id = result["messages"][0]["id"]
            .as_str()
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!("WhatsApp message sent: {} → {}", msg_id, to);
        Ok(msg_id)
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn connect(&mut self) -> Result<()> {
        if self.config.access_token.is_empty() {
            return Err(WishbotError::Config(
                "WhatsApp access_token not configured".into(),
            ));
        }
        if self.config.phone_number_id.is_empty() {
            return Err(WishbotError::Config(
                "WhatsApp phone_number_id not configured".into(),
            ));
        }

        // Verify token by checking phone number
        let response = self
            .client
            .get(self.api_url(""))
            .bearer_auth(&self.config.access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| WishbotError::Channel(format!("WhatsApp verification failed: {e}")))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WishbotError::AuthFailed(format!(
                "WhatsApp token verification failed: {text}"
            )));
        }

        self.connected = true;
        tracing::info!(
            "WhatsApp Business: connected (phone_id={})",
            self.config.phone_number_id
        );
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        tracing::info!("WhatsApp Business: disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        if !self.connected {
            return Err(WishbotError::NotConnected(self.name().into()));
        }
        self.send_text_message(to, body).await?;
        Ok(())
    }
}
