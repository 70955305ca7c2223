use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch({status}): {status_text}")]
    Http { status: u16, status_text: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl FetchError {
    /// Builds the HTTP failure for a response that was not `ok`.
    ///
    /// `reason` is the phrase the server sent on the status line. Without
    /// one the canonical reason is used, then `"Unknown"`.
    pub fn from_status(status: StatusCode, reason: Option<&str>) -> Self {
        let status_text = reason
            .or_else(|| status.canonical_reason())
            .unwrap_or("Unknown");
        FetchError::Http {
            status: status.as_u16(),
            status_text: status_text.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, FetchError::Http { .. })
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
