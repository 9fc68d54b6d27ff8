//! HTTP transport for the personal-library backend.
//!
//! Covers the unauthenticated credential exchange (`/signin`, `/signup`) and
//! the bearer-authenticated resources (`/me`, `/library`). Responses are
//! classified into authorization failures, backend-reported failures and
//! transport/decode failures; deciding what to do about them is left to the
//! caller.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::LibraryApiClient;
pub use config::LibraryApiConfig;
pub use error::LibraryApiError;
pub use payload::{Credentials, LibraryEntry, NewLibraryEntry, Profile, TokenResponse};
pub use reqwest::StatusCode;
pub use url::{normalize_base_url, DEFAULT_BACKEND_BASE_URL};
