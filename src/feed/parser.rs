use once_cell::sync::Lazy;
use regex::Regex;

use super::entities::{display_text, markup_text};
use super::types::FeedItem;

static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<item(?:\s[^>]*)?>(.*?)</item\s*>").expect("valid item regex")
});
static TITLE_RE: Lazy<Regex> = Lazy::new(|| tag_regex("title"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| tag_regex("link"));
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| tag_regex("description"));
static PUB_DATE_RE: Lazy<Regex> = Lazy::new(|| tag_regex("pubDate"));
static CONTENT_RE: Lazy<Regex> = Lazy::new(|| tag_regex("content:encoded"));

/// `<tag attr="...">inner</tag>`, case-insensitive and non-greedy.
fn tag_regex(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>")).expect("valid tag regex")
}

/// How the `content` field of each item is cleaned up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// Keep markup so image patterns can be searched.
    #[default]
    PreserveMarkup,
    /// Reduce to display text, same as title and description.
    StripMarkup,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub content: ContentMode,
}

/// Tag-delimited RSS item extraction.
///
/// This does not validate the document. Anything that looks like an
/// `<item>` block is considered, and unclosed or stray tags only cost the
/// items they break.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    options: ParseOptions,
}

impl FeedParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Items in document order. Items without a title or link are dropped.
    pub fn parse(&self, body: &str) -> Vec<FeedItem> {
        let items: Vec<FeedItem> = ITEM_RE
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .filter_map(|block| self.parse_item(block.as_str()))
            .collect();
        tracing::debug!(items = items.len(), "Parsed feed body");
        items
    }

    fn parse_item(&self, block: &str) -> Option<FeedItem> {
        let title = extract_tag(&TITLE_RE, block)
            .map(display_text)
            .unwrap_or_default();
        let link = extract_tag(&LINK_RE, block)
            .map(markup_text)
            .unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            tracing::debug!(title = %title, link = %link, "Dropping item without title or link");
            return None;
        }

        let raw_description = extract_tag(&DESCRIPTION_RE, block);
        let raw_content = extract_tag(&CONTENT_RE, block)
            .or(raw_description)
            .unwrap_or_default();
        let content = match self.options.content {
            ContentMode::PreserveMarkup => markup_text(raw_content),
            ContentMode::StripMarkup => display_text(raw_content),
        };

        Some(FeedItem {
            title,
            link,
            description: raw_description.map(display_text).unwrap_or_default(),
            content,
            published_at: extract_tag(&PUB_DATE_RE, block)
                .map(markup_text)
                .unwrap_or_default(),
        })
    }
}

/// Inner text of the first occurrence of a tag, trimmed. `None` when that
/// occurrence is empty.
fn extract_tag<'a>(re: &Regex, block: &'a str) -> Option<&'a str> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}
