use std::fmt;

use reqwest::StatusCode;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum CatalogApiError {
    InvalidBaseUrl(String),
    UnknownField(String),
    Request(reqwest::Error),
    Status(StatusCode),
    Decode(JsonError),
}

impl CatalogApiError {
    /// Transport and decode failures carry no user-facing detail; callers
    /// show a generic message for them.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status(_) | Self::Decode(_))
    }
}

impl fmt::Display for CatalogApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid catalog base URL: {value}"),
            Self::UnknownField(value) => write!(
                f,
                "unknown search field '{value}' (expected title, author, isbn or subject)"
            ),
            Self::Request(error) => write!(f, "catalog request error: {error}"),
            Self::Status(status) => write!(f, "catalog returned HTTP {status}"),
            Self::Decode(error) => write!(f, "malformed catalog response: {error}"),
        }
    }
}

impl std::error::Error for CatalogApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Decode(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CatalogApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for CatalogApiError {
    fn from(error: JsonError) -> Self {
        Self::Decode(error)
    }
}
