use std::sync::Arc;

use catalog_api::CatalogRecord;
use library_api::{LibraryApiError, LibraryEntry, NewLibraryEntry, Profile};
use tracing::{debug, warn};

use crate::backend::LibraryBackend;
use crate::error::{SyncAction, SyncError};
use crate::mirror::LibraryMirror;
use crate::session::SessionHandle;

/// Authenticated library client with a local mirror.
pub struct LibrarySync<B> {
    backend: Arc<B>,
    session: SessionHandle,
    mirror: LibraryMirror,
}

impl<B> Clone for LibrarySync<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
            mirror: self.mirror.clone(),
        }
    }
}

impl<B: LibraryBackend> LibrarySync<B> {
    pub fn new(backend: B, session: SessionHandle) -> Self {
        Self::with_shared_backend(Arc::new(backend), session)
    }

    pub fn with_shared_backend(backend: Arc<B>, session: SessionHandle) -> Self {
        Self {
            backend,
            session,
            mirror: LibraryMirror::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn mirror(&self) -> &LibraryMirror {
        &self.mirror
    }

    #[must_use]
    pub fn entries(&self) -> Vec<LibraryEntry> {
        self.mirror.entries()
    }

    /// Fetches the full library and replaces the mirror with it.
    pub async fn list_entries(&self) -> Result<Vec<LibraryEntry>, SyncError> {
        let token = self.require_token()?;
        debug!("fetching library");
        let entries = self
            .backend
            .list_entries(&token)
            .await
            .map_err(|error| self.classify(&token, SyncAction::List, error))?;

        if self.is_current(&token) {
            self.mirror.replace(entries);
        } else {
            debug!("session changed while listing, mirror left untouched");
        }
        Ok(self.mirror.entries())
    }

    /// Saves `record` unless its key is already stored or being saved. The
    /// mirror only changes once the backend confirms.
    pub async fn save_entry(&self, record: &CatalogRecord) -> Result<LibraryEntry, SyncError> {
        let token = self.require_token()?;
        let Some(reservation) = self.mirror.reserve(&record.key) else {
            debug!(key = %record.key, "book already in library, save skipped");
            return Err(SyncError::AlreadyInLibrary {
                key: record.key.clone(),
            });
        };

        debug!(key = %record.key, "saving book");
        let entry = self
            .backend
            .save_entry(&token, &new_entry_from_record(record))
            .await
            .map_err(|error| self.classify(&token, SyncAction::Save, error))?;

        if self.is_current(&token) {
            reservation.complete(entry.clone());
        }
        Ok(entry)
    }

    /// Deletes the entry with backend id `id`. Returns the mirrored entry it
    /// removed, if the mirror had one.
    pub async fn remove_entry(&self, id: &str) -> Result<Option<LibraryEntry>, SyncError> {
        let token = self.require_token()?;
        debug!(id, "removing book");
        self.backend
            .remove_entry(&token, id)
            .await
            .map_err(|error| self.classify(&token, SyncAction::Remove, error))?;

        if self.is_current(&token) {
            Ok(self.mirror.remove_by_id(id))
        } else {
            Ok(None)
        }
    }

    pub async fn profile(&self) -> Result<Profile, SyncError> {
        let token = self.require_token()?;
        self.backend
            .profile(&token)
            .await
            .map_err(|error| self.classify(&token, SyncAction::Profile, error))
    }

    fn require_token(&self) -> Result<String, SyncError> {
        self.session.current_token().ok_or(SyncError::SignInRequired)
    }

    fn is_current(&self, token: &str) -> bool {
        self.session.current_token().as_deref() == Some(token)
    }

    /// A 401 ends the session that sent the request. If a different session
    /// has started since, the failure is reported as a plain rejection.
    fn classify(&self, token: &str, action: SyncAction, error: LibraryApiError) -> SyncError {
        if !error.is_unauthorized() {
            return SyncError::from_backend(action, error);
        }

        match self.session.expire(token) {
            Ok(true) => {
                self.mirror.clear();
                SyncError::SessionExpired
            }
            Ok(false) if self.session.is_authenticated() => SyncError::from_backend(action, error),
            Ok(false) => SyncError::SessionExpired,
            Err(store_error) => {
                warn!(%store_error, "failed to clear expired session");
                self.mirror.clear();
                SyncError::SessionExpired
            }
        }
    }
}

/// Request body for saving a catalog record.
pub fn new_entry_from_record(record: &CatalogRecord) -> NewLibraryEntry {
    NewLibraryEntry {
        key: record.key.clone(),
        title: record.title.clone(),
        authors: record.authors.clone(),
        cover: record.cover_id,
        first_publish_year: record.first_publish_year,
    }
}
