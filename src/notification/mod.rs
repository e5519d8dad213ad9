pub mod formatter;
pub mod types;

use std::future::Future;

use crate::errors::DeliveryError;
use crate::telegram::client::TelegramClient;
use crate::webhook::client::WebhookClient;

pub use formatter::{Formatter, FormatterConfig};
pub use types::{EmbedFooter, EmbedImage, NotificationPayload};

/// Something that can deliver a notification. One attempt per call.
pub trait Notifier {
    fn send(
        &self,
        payload: &NotificationPayload,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// The configured delivery channel.
pub enum Transport {
    Webhook(WebhookClient),
    Telegram(TelegramClient),
}

impl Transport {
    pub fn kind(&self) -> &'static str {
        match self {
            Transport::Webhook(_) => "webhook",
            Transport::Telegram(_) => "telegram",
        }
    }
}

impl Notifier for Transport {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        match self {
            Transport::Webhook(client) => client.send(payload).await,
            Transport::Telegram(client) => client.send(payload).await,
        }
    }
}
