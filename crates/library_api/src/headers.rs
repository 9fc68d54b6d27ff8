use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::config::LibraryApiConfig;
use crate::error::LibraryApiError;

pub(crate) fn default_headers(config: &LibraryApiConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    if let Ok(value) = HeaderValue::from_str(&user_agent) {
        headers.insert(USER_AGENT, value);
    }

    headers
}

/// `Authorization` value for a session token. The value is marked sensitive
/// so it is redacted from debug output.
pub fn bearer_header(token: &str) -> Result<HeaderValue, LibraryApiError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(LibraryApiError::MissingToken);
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| LibraryApiError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

fn default_user_agent() -> String {
    format!(
        "bookfinder/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
