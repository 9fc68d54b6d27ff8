use std::time::Duration;

use crate::url::DEFAULT_BACKEND_BASE_URL;

/// Transport configuration for backend requests.
#[derive(Debug, Clone)]
pub struct LibraryApiConfig {
    /// Base URL every backend path is resolved against.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for LibraryApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            user_agent: None,
            timeout: None,
        }
    }
}

impl LibraryApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
