use chrono::{DateTime, SecondsFormat, Utc};

use super::types::{EmbedFooter, EmbedImage, NotificationPayload};
use crate::errors::FormatError;
use crate::feed::{extract_image_url, FeedItem};

pub const DESCRIPTION_LIMIT: usize = 2000;
pub const PLACEHOLDER_DESCRIPTION: &str = "No description available";

pub const DEFAULT_COLOR: u32 = 0xff6b35;
pub const DEFAULT_FOOTER_TEXT: &str = "Bring a Trailer";
pub const DEFAULT_FOOTER_ICON_URL: &str = "https://bringatrailer.com/favicon.ico";

/// Fixed, feed-level parts of every notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    pub color: u32,
    pub footer_text: String,
    pub footer_icon_url: String,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            footer_text: DEFAULT_FOOTER_TEXT.to_string(),
            footer_icon_url: DEFAULT_FOOTER_ICON_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    /// Build the notification for one item.
    ///
    /// Fails only on a missing or unparsable publish date; a missing image is
    /// not an error.
    pub fn format(&self, item: &FeedItem) -> Result<NotificationPayload, FormatError> {
        let timestamp = format_timestamp(&item.published_at)?;

        let description = if item.description.is_empty() {
            PLACEHOLDER_DESCRIPTION.to_string()
        } else {
            item.description.chars().take(DESCRIPTION_LIMIT).collect()
        };

        let image = extract_image_url(&item.content).map(|url| EmbedImage { url: url.into() });

        Ok(NotificationPayload {
            color: self.config.color,
            title: item.title.clone(),
            url: item.link.clone(),
            description,
            timestamp,
            footer: EmbedFooter {
                text: self.config.footer_text.clone(),
                icon_url: self.config.footer_icon_url.clone(),
            },
            image,
        })
    }
}

/// Parse an RSS `pubDate` (RFC 2822, or RFC 3339 as a fallback) and emit it
/// as RFC 3339 UTC with milliseconds.
pub fn format_timestamp(raw: &str) -> Result<String, FormatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormatError::MissingTimestamp);
    }

    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_err(|source| FormatError::InvalidTimestamp {
            value: raw.to_string(),
            source,
        })?;

    Ok(parsed
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}
