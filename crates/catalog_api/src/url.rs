use url::Url;

use crate::error::CatalogApiError;
use crate::record::CoverSize;

/// Default base URL for catalog search requests.
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://openlibrary.org";

const SEARCH_PATH: &str = "search.json";
const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b/id";

/// Resolve the search endpoint beneath a base URL.
///
/// A blank base falls back to [`DEFAULT_CATALOG_BASE_URL`]. Trailing slashes
/// are ignored so `https://host/` and `https://host` resolve identically.
pub fn search_endpoint(input: &str) -> Result<Url, CatalogApiError> {
    let base = if input.trim().is_empty() {
        DEFAULT_CATALOG_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/{SEARCH_PATH}"))
        .map_err(|error| CatalogApiError::InvalidBaseUrl(format!("{base}: {error}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(CatalogApiError::InvalidBaseUrl(format!(
            "{base}: unsupported scheme '{scheme}'"
        ))),
    }
}

/// Cover image URL for a catalog cover identifier.
pub fn cover_url(cover_id: u64, size: CoverSize) -> String {
    format!("{COVERS_BASE_URL}/{cover_id}-{}.jpg", size.as_str())
}
