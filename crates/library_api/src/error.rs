use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryApiError {
    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("a session token is required for this request")]
    MissingToken,
    #[error("session token is not a valid header value")]
    InvalidToken,
    /// The backend rejected the bearer token (HTTP 401).
    #[error("backend rejected the session token{}", detail(.message))]
    Unauthorized { message: Option<String> },
    #[error("backend returned HTTP {status}{}", detail(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("backend request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LibraryApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message the backend put in its `{ "error": ... }` body, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}
