pub mod entities;
pub mod image;
pub mod parser;
pub mod types;

pub use image::extract_image_url;
pub use parser::{ContentMode, FeedParser, ParseOptions};
pub use types::FeedItem;
