use library_api::Credentials;
use tracing::{debug, info};

use crate::backend::LibraryBackend;
use crate::error::{SyncAction, SyncError};
use crate::sync::LibrarySync;

/// Both fields must be non-blank after trimming. The returned credentials
/// carry the trimmed username and the password as typed.
pub fn validate_credentials(username: &str, password: &str) -> Result<Credentials, SyncError> {
    let username = username.trim();
    if username.is_empty() || password.trim().is_empty() {
        return Err(SyncError::MissingCredentials);
    }
    Ok(Credentials::new(username, password))
}

impl<B: LibraryBackend> LibrarySync<B> {
    /// Signs in and stores the returned token. Any previous mirror is dropped.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), SyncError> {
        let credentials = validate_credentials(username, password)?;
        debug!(username = %credentials.username, "signing in");
        let token = self
            .backend()
            .sign_in(&credentials)
            .await
            .map_err(|error| SyncError::from_backend(SyncAction::SignIn, error))?;
        self.start_session(&token)?;
        info!(username = %credentials.username, "signed in");
        Ok(())
    }

    /// Registers and signs in with the returned token.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<(), SyncError> {
        let credentials = validate_credentials(username, password)?;
        debug!(username = %credentials.username, "signing up");
        let token = self
            .backend()
            .sign_up(&credentials)
            .await
            .map_err(|error| SyncError::from_backend(SyncAction::SignUp, error))?;
        self.start_session(&token)?;
        info!(username = %credentials.username, "signed up");
        Ok(())
    }

    /// Clears the session and the mirror.
    pub fn logout(&self) -> Result<(), SyncError> {
        self.mirror().clear();
        self.session().clear_token()?;
        info!("signed out");
        Ok(())
    }

    fn start_session(&self, token: &str) -> Result<(), SyncError> {
        self.mirror().clear();
        self.session().set_token(token)?;
        Ok(())
    }
}
