use url::Url;

use crate::error::LibraryApiError;

/// Default backend base URL for local development.
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:5000";

/// Validate a backend base URL. A blank input falls back to
/// [`DEFAULT_BACKEND_BASE_URL`].
pub fn normalize_base_url(input: &str) -> Result<Url, LibraryApiError> {
    let base = if input.trim().is_empty() {
        DEFAULT_BACKEND_BASE_URL
    } else {
        input.trim()
    };

    let url = Url::parse(base)
        .map_err(|error| LibraryApiError::InvalidBaseUrl(format!("{base}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LibraryApiError::InvalidBaseUrl(format!(
            "{base}: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(LibraryApiError::InvalidBaseUrl(base.to_string()));
    }

    Ok(url)
}

/// Append path segments to `base`. Each segment is percent-encoded, so an
/// identifier containing `/` stays a single segment.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, LibraryApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| LibraryApiError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
