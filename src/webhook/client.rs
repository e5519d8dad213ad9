use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::errors::DeliveryError;
use crate::notification::{NotificationPayload, Notifier};
use crate::USER_AGENT;

/// Posts embed payloads to a chat webhook (Discord-compatible body).
pub struct WebhookClient {
    client: reqwest::Client,
    webhook_url: Url,
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    embeds: [&'a NotificationPayload; 1],
}

impl WebhookClient {
    pub fn new(webhook_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            webhook_url,
        })
    }
}

impl Notifier for WebhookClient {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let message = WebhookMessage { embeds: [payload] };

        let response = match self
            .client
            .post(self.webhook_url.clone())
            .json(&message)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Error posting to webhook");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Webhook returned non-success");
            return Err(DeliveryError::Status { status, body });
        }

        tracing::info!(title = %payload.title, link = %payload.url, "Posted notification to webhook");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::EmbedFooter;

    #[test]
    fn test_body_wraps_single_embed() {
        let payload = NotificationPayload {
            color: 0xff6b35,
            title: "Listing".to_string(),
            url: "https://x.test/1".to_string(),
            description: "Desc".to_string(),
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            footer: EmbedFooter {
                text: "Bring a Trailer".to_string(),
                icon_url: "https://x.test/favicon.ico".to_string(),
            },
            image: None,
        };
        let body = serde_json::to_value(WebhookMessage { embeds: [&payload] }).unwrap();
        assert_eq!(body["embeds"].as_array().unwrap().len(), 1);
        assert_eq!(body["embeds"][0]["color"], 0xff6b35);
        assert_eq!(body["embeds"][0]["footer"]["icon_url"], "https://x.test/favicon.ico");
        assert!(body["embeds"][0].get("image").is_none());
    }
}
