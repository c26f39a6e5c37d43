//! Telegram notifier.
//!
//! Delivers plain-text messages to a fixed chat via the Bot API
//! `sendMessage` method.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use statuswatch_core::{Error, Notifier, Result};
use tracing::instrument;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Override the Bot API base URL (local fixtures).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn id(&self) -> &'static str {
        "telegram"
    }

    #[instrument(level = "info", skip(self, text))]
    async fn send(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.send_url())
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("telegram request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Delivery(format!("telegram returned {status}: {body}")));
        }

        let body: SendMessageResponse = resp
            .json()
            .await
            .map_err(|e| Error::Delivery(format!("telegram response: {e}")))?;
        if !body.ok {
            return Err(Error::Delivery(format!(
                "telegram sendMessage failed: {}",
                body.description.unwrap_or_else(|| "unknown".to_string())
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_url_embeds_token_and_method() {
        let n = TelegramNotifier::new("abc", "42").with_api_base("http://localhost:9999");
        assert_eq!(n.send_url(), "http://localhost:9999/botabc/sendMessage");
    }

    #[test]
    fn error_envelope_deserializes() {
        let body: SendMessageResponse =
            serde_json::from_str(r#"{"ok": false, "description": "chat not found"}"#).unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("chat not found"));
    }
}
