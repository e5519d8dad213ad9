pub mod api;
pub mod config;
pub mod errors;
pub mod feed;
pub mod notification;
pub mod observability;
pub mod state;
pub mod tasks;
pub mod telegram;
pub mod webhook;

/// Sent on every outbound request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
