use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;

use super::detector::{Decision, LastSeen};
use super::source::FeedSource;
use crate::{
    errors::{AppError, CycleError, FetchError},
    feed::{FeedItem, FeedParser},
    notification::{Formatter, NotificationPayload, Notifier},
    state::AppState,
};

/// What a single poll cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    FetchFailed { error: String },
    NoItems,
    Unchanged { link: String },
    FormatFailed { link: String, error: String },
    DeliveryFailed { link: String, error: String },
    Notified { link: String, title: String },
}

/// The newest item and the notification it would produce.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub items_found: usize,
    pub item: FeedItem,
    pub payload: NotificationPayload,
}

/// Fetch → parse → detect → format → send, one cycle at a time.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    parser: FeedParser,
    formatter: Formatter,
}

impl<S: FeedSource, N: Notifier> Monitor<S, N> {
    pub fn new(source: S, notifier: N, parser: FeedParser, formatter: Formatter) -> Self {
        Self {
            source,
            notifier,
            parser,
            formatter,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub async fn fetch_items(&self) -> Result<Vec<FeedItem>, FetchError> {
        fetch_items(&self.source, &self.parser).await
    }

    /// Run one cycle against `last_seen` and hand back the state for the
    /// next one. The state only moves after a successful send.
    pub async fn run_cycle(&self, last_seen: LastSeen) -> (LastSeen, CycleOutcome) {
        let started = Instant::now();
        let feed_url = self.source.url();

        let items = match self.fetch_items().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(feed_url = %feed_url, error = %e, "Error fetching feed");
                let outcome = CycleOutcome::FetchFailed {
                    error: e.to_string(),
                };
                return (last_seen, outcome);
            }
        };
        tracing::info!(feed_url = %feed_url, items = items.len(), "Found items in feed");

        let item = match last_seen.decide(&items) {
            Decision::NoItems => {
                tracing::warn!(feed_url = %feed_url, "No items found in feed");
                return (last_seen, CycleOutcome::NoItems);
            }
            Decision::Unchanged => {
                tracing::info!(feed_url = %feed_url, "No new listings found");
                let link = last_seen.link().unwrap_or_default().to_string();
                return (last_seen, CycleOutcome::Unchanged { link });
            }
            Decision::New(item) => item,
        };
        tracing::info!(title = %item.title, link = %item.link, "New listing found");

        let payload = match self.formatter.format(&item) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(link = %item.link, error = %e, "Unable to format notification, nothing sent");
                let outcome = CycleOutcome::FormatFailed {
                    link: item.link,
                    error: e.to_string(),
                };
                return (last_seen, outcome);
            }
        };

        match self.notifier.send(&payload).await {
            Ok(()) => {
                tracing::info!(
                    link = %item.link,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Feed processing completed"
                );
                let outcome = CycleOutcome::Notified {
                    link: item.link.clone(),
                    title: item.title.clone(),
                };
                (last_seen.advance(item), outcome)
            }
            Err(e) => {
                tracing::error!(link = %item.link, error = %e, "Notification failed, will retry next cycle");
                let outcome = CycleOutcome::DeliveryFailed {
                    link: item.link,
                    error: e.to_string(),
                };
                (last_seen, outcome)
            }
        }
    }

    /// Build the notification for the newest item without sending it.
    pub async fn preview(&self) -> Result<Option<Preview>, CycleError> {
        preview(&self.source, &self.parser, &self.formatter).await
    }
}

pub async fn fetch_items<S: FeedSource>(
    source: &S,
    parser: &FeedParser,
) -> Result<Vec<FeedItem>, FetchError> {
    let body = source.fetch().await?;
    Ok(parser.parse(&body))
}

/// Fetch, parse and format the newest item. Needs no transport.
pub async fn preview<S: FeedSource>(
    source: &S,
    parser: &FeedParser,
    formatter: &Formatter,
) -> Result<Option<Preview>, CycleError> {
    let items = fetch_items(source, parser).await?;
    let items_found = items.len();
    let Some(item) = items.into_iter().next() else {
        return Ok(None);
    };
    let payload = formatter.format(&item)?;
    Ok(Some(Preview {
        items_found,
        item,
        payload,
    }))
}

/// Scheduler loop: one cycle per poll interval. A tick that lands while a
/// manual check is still running is skipped.
pub async fn start(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(state.config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        tracing::info!("Scheduled feed check triggered");

        match state.run_check().await {
            Ok(outcome) => tracing::debug!(?outcome, "Scheduled feed check finished"),
            Err(AppError::CheckInProgress) => {
                tracing::info!("Feed check already running, skipping this tick")
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled feed check cannot run");
                return;
            }
        }
    }
}
