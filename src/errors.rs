use actix_web::{HttpResponse, ResponseError};
use reqwest::StatusCode;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// The feed GET failed. The cycle stops and the last-seen item is kept.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("feed returned non-success status {0}")]
    Status(StatusCode),
}

/// The newest item cannot be turned into a notification. Nothing is sent.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("item has no published date")]
    MissingTimestamp,
    #[error("unparsable published date {value:?}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// The notification was not accepted. The same item is retried next cycle.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("notification endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// A cycle that stopped before anything could be sent.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("no notification transport configured; set FH_WEBHOOK_URL or FH_TELEGRAM_BOT_TOKEN and FH_TELEGRAM_CHAT_ID")]
    MissingTransport,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ConfigError {
    pub fn invalid(key: &'static str, message: impl fmt::Display) -> Self {
        ConfigError::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Errors surfaced by the HTTP routes
#[derive(Debug)]
pub enum AppError {
    CheckInProgress,
    ConfigurationError,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::CheckInProgress => write!(f, "A feed check is already running - try again shortly"),
            AppError::ConfigurationError => write!(f, "Notification transport is not configured"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::CheckInProgress => StatusCode::CONFLICT,
            AppError::ConfigurationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_code = match self {
            AppError::CheckInProgress => "CHECK_IN_PROGRESS",
            AppError::ConfigurationError => "CONFIGURATION_ERROR",
        };

        match self {
            AppError::CheckInProgress => tracing::info!("Client error: {:?}", self),
            AppError::ConfigurationError => tracing::error!("Server error: {:?}", self),
        }

        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string()
            }
        }))
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;
