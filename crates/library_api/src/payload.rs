use std::fmt;

use serde::{Deserialize, Serialize};

/// Username/password pair sent to `/signin` and `/signup`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub username: String,
}

/// A book as stored in the user's library.
///
/// The backend assigns `id`; some deployments spell it `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
}

/// Body of `POST /library`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLibraryEntry {
    pub key: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    /// Best-effort extraction of the backend's failure message.
    pub(crate) fn parse(body: &[u8]) -> Option<String> {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok()?;
        parsed
            .error
            .or(parsed.message)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_accepts_underscore_id() {
        let entry: LibraryEntry = serde_json::from_value(serde_json::json!({
            "_id": "65f0",
            "key": "/works/OL1W",
            "title": "Dune",
            "authors": ["Frank Herbert"],
        }))
        .expect("entry decodes");

        assert_eq!(entry.id, "65f0");
        assert_eq!(entry.cover, None);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("ada", "hunter2"));
        assert!(rendered.contains("ada"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn error_body_prefers_error_field() {
        assert_eq!(
            ErrorBody::parse(br#"{"error":"Book already in library","message":"x"}"#),
            Some("Book already in library".to_string())
        );
        assert_eq!(
            ErrorBody::parse(br#"{"message":"nope"}"#),
            Some("nope".to_string())
        );
        assert_eq!(ErrorBody::parse(br#"{"error":"  "}"#), None);
        assert_eq!(ErrorBody::parse(b"<html>"), None);
    }
}
