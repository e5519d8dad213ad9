use std::env;
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;
use crate::notification::FormatterConfig;
use crate::telegram::types::TelegramConfig;

pub const DEFAULT_FEED_URL: &str = "https://bringatrailer.com/feed/";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Where notifications go. A webhook wins when both are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Webhook { url: Url },
    Telegram(TelegramConfig),
}

impl TransportConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportConfig::Webhook { .. } => "webhook",
            TransportConfig::Telegram(_) => "telegram",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed_url: Url,
    pub transport: Option<TransportConfig>,
    pub poll_interval: Duration,
    /// Applied to the feed GET and to notification requests
    pub fetch_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub formatter: FormatterConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let feed_url = match get("FH_FEED_URL") {
            Some(url) => {
                tracing::info!(feed_url = %url, "Using feed URL from FH_FEED_URL");
                parse_url("FH_FEED_URL", &url)?
            }
            None => {
                tracing::info!(feed_url = DEFAULT_FEED_URL, "Using default feed URL");
                parse_url("FH_FEED_URL", DEFAULT_FEED_URL)?
            }
        };

        let transport = match (
            get("FH_WEBHOOK_URL"),
            get("FH_TELEGRAM_BOT_TOKEN"),
            get("FH_TELEGRAM_CHAT_ID"),
        ) {
            (Some(url), _, _) => Some(TransportConfig::Webhook {
                url: parse_url("FH_WEBHOOK_URL", &url)?,
            }),
            (None, Some(bot_token), Some(chat_id)) => {
                let api_base_url = match get("FH_TELEGRAM_API_BASE_URL") {
                    Some(base) => parse_url("FH_TELEGRAM_API_BASE_URL", &base)?
                        .as_str()
                        .trim_end_matches('/')
                        .to_string(),
                    None => TelegramConfig::DEFAULT_API_BASE_URL.to_string(),
                };
                Some(TransportConfig::Telegram(TelegramConfig {
                    bot_token,
                    chat_id,
                    api_base_url,
                }))
            }
            (None, Some(_), None) => return Err(ConfigError::Missing("FH_TELEGRAM_CHAT_ID")),
            (None, None, Some(_)) => return Err(ConfigError::Missing("FH_TELEGRAM_BOT_TOKEN")),
            (None, None, None) => None,
        };
        match &transport {
            Some(transport) => tracing::info!(transport = transport.kind(), "Notification transport configured"),
            None => tracing::warn!("No notification transport configured"),
        }

        let poll_interval = parse_secs(
            "FH_POLL_INTERVAL_SECS",
            get("FH_POLL_INTERVAL_SECS"),
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        let fetch_timeout = parse_secs(
            "FH_FETCH_TIMEOUT_SECS",
            get("FH_FETCH_TIMEOUT_SECS"),
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;

        let host = get("FH_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("FH_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("FH_PORT", e))?,
            None => DEFAULT_PORT,
        };

        let mut formatter = FormatterConfig::default();
        if let Some(color) = get("FH_EMBED_COLOR") {
            formatter.color = u32::from_str_radix(color.trim_start_matches('#'), 16)
                .map_err(|e| ConfigError::invalid("FH_EMBED_COLOR", e))?;
        }
        if let Some(text) = get("FH_FOOTER_TEXT") {
            formatter.footer_text = text;
        }
        if let Some(icon) = get("FH_FOOTER_ICON_URL") {
            formatter.footer_icon_url = parse_url("FH_FOOTER_ICON_URL", &icon)?.into();
        }

        Ok(Self {
            feed_url,
            transport,
            poll_interval,
            fetch_timeout,
            host,
            port,
            formatter,
        })
    }

    pub fn require_transport(&self) -> Result<&TransportConfig, ConfigError> {
        self.transport.as_ref().ok_or(ConfigError::MissingTransport)
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::invalid(key, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::invalid(key, format!("unsupported scheme {other}"))),
    }
}

fn parse_secs(key: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(value) => value
            .parse::<u64>()
            .map_err(|e| ConfigError::invalid(key, e))?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
