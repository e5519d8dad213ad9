use serde::{Deserialize, Serialize};

/// One `<item>` pulled out of the polled feed. Built fresh on every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// `<content:encoded>`, or the raw description when the feed has none
    pub content: String,
    /// Unparsed `<pubDate>` text
    pub published_at: String,
}
