//! Durable slot for the client's session token.
//!
//! The store holds at most one bearer token. It is read on every
//! authenticated request and is the only state shared between the catalog,
//! library and view components. Mutation happens through
//! [`SessionStore::set_token`] and [`SessionStore::clear_token`] only.

mod error;
mod paths;
mod schema;
mod store;

pub use error::SessionStoreError;
pub use paths::{default_session_path, session_root, SESSION_DIR, SESSION_FILE_NAME};
pub use schema::{SessionRecord, SessionRecordType, SESSION_RECORD_VERSION};
pub use store::{SessionState, SessionStore};
