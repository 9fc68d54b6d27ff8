use library_api::LibraryApiError;
use session_store::SessionStoreError;
use thiserror::Error;

use crate::notice;

/// Operation a failure belongs to. Picks the fallback message when the
/// backend gives none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    SignIn,
    SignUp,
    Profile,
    List,
    Save,
    Remove,
}

impl SyncAction {
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::SignIn => "Signin failed",
            Self::SignUp => "Signup failed",
            Self::Profile => "Failed to fetch user info",
            Self::List => "Failed to fetch library",
            Self::Save => "Failed to save book",
            Self::Remove => "Failed to remove book",
        }
    }
}

/// Failure of a library or authentication operation. `Display` is the text
/// shown to the user.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{}", notice::MISSING_CREDENTIALS)]
    MissingCredentials,
    #[error("{}", notice::SIGN_IN_REQUIRED)]
    SignInRequired,
    #[error("{}", notice::ALREADY_IN_LIBRARY)]
    AlreadyInLibrary { key: String },
    #[error("{}", notice::SESSION_EXPIRED)]
    SessionExpired,
    /// The backend answered with a non-success status.
    #[error("{}", rejected_message(.action, .message))]
    Rejected {
        action: SyncAction,
        message: Option<String>,
    },
    /// The request never produced a usable response.
    #[error("{}", .action.fallback_message())]
    Transport {
        action: SyncAction,
        #[source]
        source: LibraryApiError,
    },
    #[error("failed to update the stored session: {0}")]
    Session(#[from] SessionStoreError),
}

impl SyncError {
    /// Maps a backend failure that is not an authorization failure.
    pub(crate) fn from_backend(action: SyncAction, error: LibraryApiError) -> Self {
        match error {
            LibraryApiError::Unauthorized { message } | LibraryApiError::Status { message, .. } => {
                Self::Rejected { action, message }
            }
            source => Self::Transport { action, source },
        }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Caught before any request was sent.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials | Self::SignInRequired | Self::AlreadyInLibrary { .. }
        )
    }
}

fn rejected_message(action: &SyncAction, message: &Option<String>) -> String {
    message
        .as_deref()
        .unwrap_or_else(|| action.fallback_message())
        .to_string()
}
