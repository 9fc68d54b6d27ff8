use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::LibraryApiConfig;
use crate::error::LibraryApiError;
use crate::headers::{bearer_header, default_headers};
use crate::payload::{
    Credentials, ErrorBody, LibraryEntry, NewLibraryEntry, Profile, TokenResponse,
};
use crate::url::{endpoint, normalize_base_url};

#[derive(Debug)]
pub struct LibraryApiClient {
    http: Client,
    config: LibraryApiConfig,
    base_url: Url,
}

impl LibraryApiClient {
    pub fn new(config: LibraryApiConfig) -> Result<Self, LibraryApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let mut builder = Client::builder().default_headers(default_headers(&config));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &LibraryApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges credentials for a session token.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<String, LibraryApiError> {
        self.exchange_credentials("signin", credentials).await
    }

    /// Registers a new account. The backend signs the user in on success.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<String, LibraryApiError> {
        self.exchange_credentials("signup", credentials).await
    }

    pub async fn profile(&self, token: &str) -> Result<Profile, LibraryApiError> {
        let request = self.http.get(endpoint(&self.base_url, &["me"])?);
        let response = send_authenticated(request, token).await?;
        decode(response).await
    }

    pub async fn list_entries(&self, token: &str) -> Result<Vec<LibraryEntry>, LibraryApiError> {
        let request = self.http.get(endpoint(&self.base_url, &["library"])?);
        let response = send_authenticated(request, token).await?;
        decode(response).await
    }

    /// Saves a book and returns the stored entry, including its backend id.
    pub async fn save_entry(
        &self,
        token: &str,
        entry: &NewLibraryEntry,
    ) -> Result<LibraryEntry, LibraryApiError> {
        let request = self
            .http
            .post(endpoint(&self.base_url, &["library"])?)
            .json(entry);
        let response = send_authenticated(request, token).await?;
        decode(response).await
    }

    /// Deletes an entry by backend id. The response body is ignored.
    pub async fn remove_entry(&self, token: &str, id: &str) -> Result<(), LibraryApiError> {
        let request = self
            .http
            .delete(endpoint(&self.base_url, &["library", id])?);
        send_authenticated(request, token).await?;
        Ok(())
    }

    async fn exchange_credentials(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<String, LibraryApiError> {
        debug!(path, username = %credentials.username, "sending credential exchange");
        let request = self
            .http
            .post(endpoint(&self.base_url, &[path])?)
            .json(credentials);
        let response = request.send().await?;
        let response = check_status(response, false).await?;
        let token = decode::<TokenResponse>(response).await?.token;
        if token.trim().is_empty() {
            return Err(LibraryApiError::MissingToken);
        }
        Ok(token)
    }
}

async fn send_authenticated(request: RequestBuilder, token: &str) -> Result<Response, LibraryApiError> {
    let response = request
        .header(AUTHORIZATION, bearer_header(token)?)
        .send()
        .await?;
    check_status(response, true).await
}

/// Maps a non-success response to an error. A 401 is only an authorization
/// failure when the request carried a token; credential exchanges report it
/// as a plain status.
async fn check_status(response: Response, authenticated: bool) -> Result<Response, LibraryApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = ErrorBody::parse(&body);
    debug!(%status, message = message.as_deref().unwrap_or(""), "backend request failed");

    if authenticated && status == StatusCode::UNAUTHORIZED {
        return Err(LibraryApiError::Unauthorized { message });
    }
    Err(LibraryApiError::Status { status, message })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, LibraryApiError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
