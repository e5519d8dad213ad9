pub mod detector;
pub mod runner;
pub mod source;

pub use detector::{Decision, LastSeen};
pub use runner::{CycleOutcome, Monitor, Preview};
pub use source::{FeedSource, HttpFeedSource};
