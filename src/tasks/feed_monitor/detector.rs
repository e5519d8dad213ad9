use crate::feed::FeedItem;

/// The most recently notified item, if any.
///
/// Owned by whoever drives the cycles and handed in and out of each one.
/// Nothing here survives a restart, so the first cycle after startup always
/// notifies the newest item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastSeen(Option<FeedItem>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing parsed; treated as a transient failure.
    NoItems,
    Unchanged,
    New(FeedItem),
}

impl LastSeen {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn item(&self) -> Option<&FeedItem> {
        self.0.as_ref()
    }

    pub fn link(&self) -> Option<&str> {
        self.0.as_ref().map(|item| item.link.as_str())
    }

    /// Compare the newest parsed item against what was last notified.
    /// Links are the only identity considered.
    pub fn decide(&self, items: &[FeedItem]) -> Decision {
        let Some(newest) = items.first() else {
            return Decision::NoItems;
        };
        if self.link() == Some(newest.link.as_str()) {
            Decision::Unchanged
        } else {
            Decision::New(newest.clone())
        }
    }

    /// Record a delivered item. An item with the current link leaves the
    /// pointer untouched.
    pub fn advance(self, item: FeedItem) -> Self {
        if self.link() == Some(item.link.as_str()) {
            self
        } else {
            Self(Some(item))
        }
    }
}
