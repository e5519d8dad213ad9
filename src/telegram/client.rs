use std::time::Duration;

use super::types::{TelegramConfig, TelegramMessage, TelegramResponse};
use crate::errors::DeliveryError;
use crate::notification::{NotificationPayload, Notifier};
use crate::USER_AGENT;

/// Delivers notifications through the Bot API `sendMessage` call.
pub struct TelegramClient {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn send_message(
        &self,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let message = TelegramMessage {
            chat_id: self.config.chat_id.clone(),
            text: text.to_string(),
            parse_mode: parse_mode.map(|s| s.to_string()),
            disable_web_page_preview: Some(false),
        };

        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        let telegram_response: TelegramResponse<serde_json::Value> = response.json().await?;

        if !telegram_response.ok {
            let error_msg = telegram_response
                .description
                .unwrap_or_else(|| "Unknown Telegram API error".to_string());
            return Err(DeliveryError::Rejected(error_msg));
        }

        if telegram_response.result.is_some() {
            Ok(())
        } else {
            Err(DeliveryError::Rejected("No result in Telegram response".to_string()))
        }
    }

    pub async fn send_html_message(&self, html_text: &str) -> Result<(), DeliveryError> {
        self.send_message(html_text, Some("HTML")).await
    }
}

impl Notifier for TelegramClient {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let text = format_telegram_message(payload);
        match self.send_html_message(&text).await {
            Ok(()) => {
                tracing::info!(chat_id = %self.config.chat_id, link = %payload.url, "Telegram message sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(chat_id = %self.config.chat_id, error = %e, "Error sending Telegram message");
                Err(e)
            }
        }
    }
}

/// Telegram HTML rendering of an embed payload. Text is escaped, URLs in
/// `href` attributes are attribute-escaped.
fn format_telegram_message(payload: &NotificationPayload) -> String {
    let mut message = format!(
        "<b><a href=\"{}\">{}</a></b>\n\n",
        html_escape::encode_double_quoted_attribute(&payload.url),
        html_escape::encode_text(&payload.title)
    );

    message.push_str(&html_escape::encode_text(&payload.description));
    message.push_str("\n\n");

    if let Some(image) = &payload.image {
        message.push_str(&format!(
            "<a href=\"{}\">📷 Photo</a>\n",
            html_escape::encode_double_quoted_attribute(&image.url)
        ));
    }

    message.push_str(&format!(
        "<i>{} · {}</i>",
        html_escape::encode_text(&payload.footer.text),
        payload.timestamp
    ));

    message
}
