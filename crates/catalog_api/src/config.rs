use std::time::Duration;

use crate::url::DEFAULT_CATALOG_BASE_URL;

/// Transport configuration for catalog search requests.
#[derive(Debug, Clone)]
pub struct CatalogApiConfig {
    /// Base URL of the catalog service.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for CatalogApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            user_agent: None,
            timeout: None,
        }
    }
}

impl CatalogApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
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
