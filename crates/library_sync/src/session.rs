use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use session_store::{SessionState, SessionStore, SessionStoreError};
use tracing::{debug, warn};

/// Shared handle to the one session store of the process.
///
/// Clones refer to the same store. `set_token`, `clear_token` and `expire`
/// are the only mutation points.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionStore>>,
}

impl SessionHandle {
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.lock().current_token().map(str::to_owned)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().current_token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<(), SessionStoreError> {
        self.lock().set_token(token)
    }

    pub fn clear_token(&self) -> Result<(), SessionStoreError> {
        self.lock().clear_token()
    }

    /// Clears the session after `rejected` failed authorization, unless a
    /// different token has been stored since. Returns whether it cleared.
    pub fn expire(&self, rejected: &str) -> Result<bool, SessionStoreError> {
        let mut store = self.lock();
        match store.current_token() {
            Some(current) if current == rejected => {
                warn!("session token rejected by backend, signing out");
                store.clear_token()?;
                Ok(true)
            }
            Some(_) => {
                debug!("ignoring authorization failure for a replaced token");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.lock().path().to_path_buf()
    }

    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        lock_unpoisoned(&self.inner)
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
