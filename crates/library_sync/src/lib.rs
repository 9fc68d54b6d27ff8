//! Authenticated library synchronization.
//!
//! [`LibrarySync`] wraps a [`LibraryBackend`] and keeps a local mirror of the
//! signed-in user's library. Every authenticated call reads the token fresh
//! from the shared [`SessionHandle`]; an authorization failure clears the
//! session before the error reaches the caller.

pub mod auth;
pub mod backend;
pub mod error;
pub mod mirror;
pub mod mock;
pub mod notice;
pub mod session;
pub mod sync;

pub use auth::validate_credentials;
pub use backend::{CatalogSource, LibraryBackend};
pub use error::{SyncAction, SyncError};
pub use mirror::{LibraryMirror, SaveReservation};
pub use session::SessionHandle;
pub use sync::{new_entry_from_record, LibrarySync};
