//! Client for the public, unauthenticated book catalog search endpoint.
//!
//! One call maps a query and a field filter onto a single
//! `GET /search.json?{field}={query}` request and returns at most
//! [`MAX_RESULTS`] records in source order. Blank queries never reach the
//! network. No retries are attempted; a failed search is reported once and the
//! caller decides whether to resubmit.

pub mod client;
pub mod config;
pub mod error;
pub mod record;
pub mod url;

pub use client::{CatalogApiClient, MAX_RESULTS};
pub use config::CatalogApiConfig;
pub use error::CatalogApiError;
pub use record::{CatalogRecord, CoverSize, SearchField, SearchResponse};
pub use url::{cover_url, search_endpoint, DEFAULT_CATALOG_BASE_URL};
