use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::CatalogApiConfig;
use crate::error::CatalogApiError;
use crate::record::{CatalogRecord, SearchField, SearchResponse};
use crate::url::search_endpoint;

/// Fixed result cap; records past this index are dropped, never re-ranked.
pub const MAX_RESULTS: usize = 20;

#[derive(Debug)]
pub struct CatalogApiClient {
    http: Client,
    config: CatalogApiConfig,
    endpoint: Url,
}

impl CatalogApiClient {
    pub fn new(config: CatalogApiConfig) -> Result<Self, CatalogApiError> {
        let endpoint = search_endpoint(&config.base_url)?;
        let mut builder = Client::builder().default_headers(default_headers(&config));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(CatalogApiError::from)?;
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &CatalogApiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds the search request without sending it. `query` is sent as given;
    /// [`CatalogApiClient::search`] trims it and rejects blank input first.
    pub fn build_request(&self, query: &str, field: SearchField) -> reqwest::RequestBuilder {
        self.http
            .get(self.endpoint.clone())
            .query(&[(field.as_str(), query)])
    }

    /// Searches the catalog. A blank query returns no records and sends nothing.
    pub async fn search(
        &self,
        query: &str,
        field: SearchField,
    ) -> Result<Vec<CatalogRecord>, CatalogApiError> {
        let query = query.trim();
        if query.is_empty() {
            debug!(%field, "blank catalog query, skipping request");
            return Ok(Vec::new());
        }

        debug!(%field, query, "sending catalog search");
        let response = self.build_request(query, field).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, "catalog search failed");
            return Err(CatalogApiError::Status(status));
        }

        let body = response.bytes().await?;
        let parsed = serde_json::from_slice::<SearchResponse>(&body)?;
        let total = parsed.docs.len();
        let records = truncate_results(parsed.docs);
        debug!(total, returned = records.len(), "catalog search settled");
        Ok(records)
    }
}

pub(crate) fn truncate_results(mut docs: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
    docs.truncate(MAX_RESULTS);
    docs
}

fn default_headers(config: &CatalogApiConfig) -> HeaderMap {
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

fn default_user_agent() -> String {
    format!(
        "bookfinder/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
