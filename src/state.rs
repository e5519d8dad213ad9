use tokio::sync::Mutex;

use crate::config::{AppConfig, TransportConfig};
use crate::errors::{AppError, ConfigError};
use crate::feed::{FeedParser, ParseOptions};
use crate::notification::{Formatter, Transport};
use crate::observability::Uptime;
use crate::tasks::feed_monitor::{CycleOutcome, HttpFeedSource, LastSeen, Monitor};
use crate::telegram::client::TelegramClient;
use crate::webhook::client::WebhookClient;

pub type LiveMonitor = Monitor<HttpFeedSource, Transport>;

/// Shared by the scheduler loop and the HTTP routes.
pub struct AppState {
    pub config: AppConfig,
    pub uptime: Uptime,
    /// `None` when no transport is configured; checks then report a
    /// configuration error instead of running.
    monitor: Option<LiveMonitor>,
    last_seen: Mutex<LastSeen>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let monitor = match &config.transport {
            Some(transport) => Some(build_monitor(&config, transport)?),
            None => None,
        };

        Ok(Self {
            config,
            uptime: Uptime::new(),
            monitor,
            last_seen: Mutex::new(LastSeen::empty()),
        })
    }

    pub fn monitor(&self) -> Option<&LiveMonitor> {
        self.monitor.as_ref()
    }

    pub async fn last_seen(&self) -> LastSeen {
        self.last_seen.lock().await.clone()
    }

    /// Run one cycle now unless another one holds the state.
    ///
    /// The stored state is only overwritten once the cycle returns, so a
    /// dropped request leaves it as it was.
    pub async fn run_check(&self) -> Result<CycleOutcome, AppError> {
        let monitor = self.monitor.as_ref().ok_or(AppError::ConfigurationError)?;
        let mut last_seen = self
            .last_seen
            .try_lock()
            .map_err(|_| AppError::CheckInProgress)?;

        let (next, outcome) = monitor.run_cycle(last_seen.clone()).await;
        *last_seen = next;
        Ok(outcome)
    }
}

/// Monitor wired to HTTP clients for the configured feed and transport.
pub fn build_monitor(
    config: &AppConfig,
    transport: &TransportConfig,
) -> Result<LiveMonitor, ConfigError> {
    let source = HttpFeedSource::new(config.feed_url.clone(), config.fetch_timeout)?;
    let notifier = match transport {
        TransportConfig::Webhook { url } => {
            Transport::Webhook(WebhookClient::new(url.clone(), config.fetch_timeout)?)
        }
        TransportConfig::Telegram(telegram) => {
            Transport::Telegram(TelegramClient::new(telegram.clone(), config.fetch_timeout)?)
        }
    };

    Ok(Monitor::new(
        source,
        notifier,
        FeedParser::new(ParseOptions::default()),
        Formatter::new(config.formatter.clone()),
    ))
}
