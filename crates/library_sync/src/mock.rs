//! Scripted in-memory backends for tests of code built on [`LibrarySync`].
//!
//! Each operation pops the next reply from its own queue. A call with an
//! empty queue fails as a transport error. [`MockReply::Pending`] never
//! settles, for exercising cancellation.
//!
//! [`LibrarySync`]: crate::LibrarySync

use std::collections::VecDeque;
use std::sync::Mutex;

use catalog_api::{CatalogApiError, CatalogRecord, SearchField};
use library_api::{
    Credentials, LibraryApiError, LibraryEntry, NewLibraryEntry, Profile, StatusCode,
};

use crate::backend::{CatalogSource, LibraryBackend};
use crate::session::lock_unpoisoned;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply<T> {
    Ok(T),
    Unauthorized,
    Rejected { status: u16, message: Option<String> },
    Transport,
    Pending,
}

impl<T> MockReply<T> {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: Some(message.into()),
        }
    }

    async fn into_backend_result(self) -> Result<T, LibraryApiError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Unauthorized => Err(LibraryApiError::Unauthorized { message: None }),
            Self::Rejected { status, message } => Err(LibraryApiError::Status {
                status: status_code(status),
                message,
            }),
            Self::Transport => Err(LibraryApiError::Decode(transport_failure())),
            Self::Pending => std::future::pending().await,
        }
    }

    async fn into_catalog_result(self) -> Result<T, CatalogApiError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Unauthorized => Err(CatalogApiError::Status(StatusCode::UNAUTHORIZED)),
            Self::Rejected { status, .. } => Err(CatalogApiError::Status(status_code(status))),
            Self::Transport => Err(CatalogApiError::Decode(transport_failure())),
            Self::Pending => std::future::pending().await,
        }
    }
}

/// One call received by [`MockBackend`]. Passwords are not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    SignIn { username: String },
    SignUp { username: String },
    Profile { token: String },
    List { token: String },
    Save { token: String, key: String },
    Remove { token: String, id: String },
}

#[derive(Debug, Default)]
struct BackendScript {
    sign_in: VecDeque<MockReply<String>>,
    sign_up: VecDeque<MockReply<String>>,
    profile: VecDeque<MockReply<Profile>>,
    list: VecDeque<MockReply<Vec<LibraryEntry>>>,
    save: VecDeque<MockReply<LibraryEntry>>,
    remove: VecDeque<MockReply<()>>,
    calls: Vec<MockCall>,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    script: Mutex<BackendScript>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sign_in(&self, reply: MockReply<String>) {
        lock_unpoisoned(&self.script).sign_in.push_back(reply);
    }

    pub fn push_sign_up(&self, reply: MockReply<String>) {
        lock_unpoisoned(&self.script).sign_up.push_back(reply);
    }

    pub fn push_profile(&self, reply: MockReply<Profile>) {
        lock_unpoisoned(&self.script).profile.push_back(reply);
    }

    pub fn push_list(&self, reply: MockReply<Vec<LibraryEntry>>) {
        lock_unpoisoned(&self.script).list.push_back(reply);
    }

    pub fn push_save(&self, reply: MockReply<LibraryEntry>) {
        lock_unpoisoned(&self.script).save.push_back(reply);
    }

    pub fn push_remove(&self, reply: MockReply<()>) {
        lock_unpoisoned(&self.script).remove.push_back(reply);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock_unpoisoned(&self.script).calls.clone()
    }

    pub fn call_count(&self) -> usize {
        lock_unpoisoned(&self.script).calls.len()
    }

    fn take<T>(
        &self,
        call: MockCall,
        queue: impl FnOnce(&mut BackendScript) -> &mut VecDeque<MockReply<T>>,
    ) -> MockReply<T> {
        let mut script = lock_unpoisoned(&self.script);
        script.calls.push(call);
        queue(&mut *script).pop_front().unwrap_or(MockReply::Transport)
    }
}

impl LibraryBackend for MockBackend {
    async fn sign_in(&self, credentials: &Credentials) -> Result<String, LibraryApiError> {
        let call = MockCall::SignIn {
            username: credentials.username.clone(),
        };
        self.take(call, |script| &mut script.sign_in)
            .into_backend_result()
            .await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<String, LibraryApiError> {
        let call = MockCall::SignUp {
            username: credentials.username.clone(),
        };
        self.take(call, |script| &mut script.sign_up)
            .into_backend_result()
            .await
    }

    async fn profile(&self, token: &str) -> Result<Profile, LibraryApiError> {
        let call = MockCall::Profile {
            token: token.to_string(),
        };
        self.take(call, |script| &mut script.profile)
            .into_backend_result()
            .await
    }

    async fn list_entries(&self, token: &str) -> Result<Vec<LibraryEntry>, LibraryApiError> {
        let call = MockCall::List {
            token: token.to_string(),
        };
        self.take(call, |script| &mut script.list)
            .into_backend_result()
            .await
    }

    async fn save_entry(
        &self,
        token: &str,
        entry: &NewLibraryEntry,
    ) -> Result<LibraryEntry, LibraryApiError> {
        let call = MockCall::Save {
            token: token.to_string(),
            key: entry.key.clone(),
        };
        self.take(call, |script| &mut script.save)
            .into_backend_result()
            .await
    }

    async fn remove_entry(&self, token: &str, id: &str) -> Result<(), LibraryApiError> {
        let call = MockCall::Remove {
            token: token.to_string(),
            id: id.to_string(),
        };
        self.take(call, |script| &mut script.remove)
            .into_backend_result()
            .await
    }
}

#[derive(Debug, Default)]
struct CatalogScript {
    replies: VecDeque<MockReply<Vec<CatalogRecord>>>,
    queries: Vec<(String, SearchField)>,
}

/// Scripted catalog. Blank queries are answered locally and not recorded,
/// matching the real client.
#[derive(Debug, Default)]
pub struct MockCatalog {
    script: Mutex<CatalogScript>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: MockReply<Vec<CatalogRecord>>) {
        lock_unpoisoned(&self.script).replies.push_back(reply);
    }

    pub fn queries(&self) -> Vec<(String, SearchField)> {
        lock_unpoisoned(&self.script).queries.clone()
    }
}

impl CatalogSource for MockCatalog {
    async fn search(
        &self,
        query: &str,
        field: SearchField,
    ) -> Result<Vec<CatalogRecord>, CatalogApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let reply = {
            let mut script = lock_unpoisoned(&self.script);
            script.queries.push((query.to_string(), field));
            script.replies.pop_front().unwrap_or(MockReply::Transport)
        };
        reply.into_catalog_result().await
    }
}

/// Backend entry with the given id, key and title.
pub fn library_entry(id: &str, key: &str, title: &str) -> LibraryEntry {
    LibraryEntry {
        id: id.to_string(),
        key: key.to_string(),
        title: title.to_string(),
        authors: Vec::new(),
        cover: None,
        first_publish_year: None,
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn transport_failure() -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom("mock transport failure")
}
