use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TelegramConfig;
use crate::error::AppError;

use super::Notifier;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` client.
pub struct TelegramNotifier {
    http: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base_url: &str, bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            http,
            endpoint: send_message_url(api_base_url, bot_token),
            chat_id: chat_id.to_string(),
        })
    }

    pub fn from_config(cfg: &TelegramConfig, timeout: Duration) -> Result<Self> {
        Self::new(&cfg.api_base_url, &cfg.bot_token, &cfg.chat_id, timeout)
    }
}

fn send_message_url(api_base_url: &str, bot_token: &str) -> String {
    format!(
        "{}/bot{}/sendMessage",
        api_base_url.trim_end_matches('/'),
        bot_token
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            // The endpoint embeds the bot token; keep it out of error chains.
            .map_err(|e| AppError::Notify(format!("sendMessage request failed: {}", e.without_url())))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<TelegramResponse>(&body).ok();
        match parsed {
            Some(r) if status.is_success() && r.ok => Ok(()),
            Some(r) => Err(AppError::Notify(format!(
                "sendMessage rejected ({}): {}",
                status,
                r.description.unwrap_or_default()
            ))
            .into()),
            None => Err(AppError::Notify(format!("sendMessage failed ({}): {}", status, body)).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_token() {
        assert_eq!(
            send_message_url("https://api.telegram.org/", "123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(SendMessageRequest {
            chat_id: "-100",
            text: "hi",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"chat_id": "-100", "text": "hi"}));
    }

    #[test]
    fn rejected_response_parses() {
        let r: TelegramResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"chat not found"}"#)
                .unwrap();
        assert!(!r.ok);
        assert_eq!(r.description.as_deref(), Some("chat not found"));
    }
}
