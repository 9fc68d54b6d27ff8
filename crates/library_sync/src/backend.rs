use catalog_api::{CatalogApiClient, CatalogApiError, CatalogRecord, SearchField};
use library_api::{
    Credentials, LibraryApiClient, LibraryApiError, LibraryEntry, NewLibraryEntry, Profile,
};

/// Personal-library backend as seen by [`crate::LibrarySync`].
#[allow(async_fn_in_trait)]
pub trait LibraryBackend {
    async fn sign_in(&self, credentials: &Credentials) -> Result<String, LibraryApiError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<String, LibraryApiError>;

    async fn profile(&self, token: &str) -> Result<Profile, LibraryApiError>;

    async fn list_entries(&self, token: &str) -> Result<Vec<LibraryEntry>, LibraryApiError>;

    async fn save_entry(
        &self,
        token: &str,
        entry: &NewLibraryEntry,
    ) -> Result<LibraryEntry, LibraryApiError>;

    async fn remove_entry(&self, token: &str, id: &str) -> Result<(), LibraryApiError>;
}

impl LibraryBackend for LibraryApiClient {
    async fn sign_in(&self, credentials: &Credentials) -> Result<String, LibraryApiError> {
        LibraryApiClient::sign_in(self, credentials).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<String, LibraryApiError> {
        LibraryApiClient::sign_up(self, credentials).await
    }

    async fn profile(&self, token: &str) -> Result<Profile, LibraryApiError> {
        LibraryApiClient::profile(self, token).await
    }

    async fn list_entries(&self, token: &str) -> Result<Vec<LibraryEntry>, LibraryApiError> {
        LibraryApiClient::list_entries(self, token).await
    }

    async fn save_entry(
        &self,
        token: &str,
        entry: &NewLibraryEntry,
    ) -> Result<LibraryEntry, LibraryApiError> {
        LibraryApiClient::save_entry(self, token, entry).await
    }

    async fn remove_entry(&self, token: &str, id: &str) -> Result<(), LibraryApiError> {
        LibraryApiClient::remove_entry(self, token, id).await
    }
}

/// Public catalog search.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn search(
        &self,
        query: &str,
        field: SearchField,
    ) -> Result<Vec<CatalogRecord>, CatalogApiError>;
}

impl CatalogSource for CatalogApiClient {
    async fn search(
        &self,
        query: &str,
        field: SearchField,
    ) -> Result<Vec<CatalogRecord>, CatalogApiError> {
        CatalogApiClient::search(self, query, field).await
    }
}
