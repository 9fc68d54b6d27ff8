use std::sync::Arc;

use catalog_api::CatalogRecord;
use library_api::{Credentials, LibraryApiError, LibraryEntry, NewLibraryEntry, Profile};
use library_sync::mock::{library_entry, MockBackend, MockCall, MockReply};
use library_sync::{LibraryBackend, LibrarySync, SessionHandle, SyncAction, SyncError};
use pretty_assertions::assert_eq;
use session_store::{SessionState, SessionStore};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    backend: Arc<MockBackend>,
    sync: LibrarySync<MockBackend>,
}

fn fixture(token: Option<&str>) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(&dir.path().join("session.json")).expect("open store");
    if let Some(token) = token {
        store.set_token(token).expect("seed token");
    }
    let backend = Arc::new(MockBackend::new());
    let sync = LibrarySync::with_shared_backend(Arc::clone(&backend), SessionHandle::new(store));
    Fixture {
        _dir: dir,
        backend,
        sync,
    }
}

fn dune() -> CatalogRecord {
    CatalogRecord::new("/works/OL123W", "Dune").with_authors(["Frank Herbert"])
}

fn dune_entry() -> LibraryEntry {
    let mut entry = library_entry("1", "/works/OL123W", "Dune");
    entry.authors = vec!["Frank Herbert".to_string()];
    entry
}

#[tokio::test]
async fn save_then_resave_sends_one_request() {
    let fx = fixture(Some("abc"));
    fx.backend.push_save(MockReply::Ok(dune_entry()));

    let saved = fx.sync.save_entry(&dune()).await.expect("first save");
    assert_eq!(saved, dune_entry());
    assert_eq!(fx.sync.entries(), vec![dune_entry()]);

    let error = fx.sync.save_entry(&dune()).await.expect_err("re-save");
    assert!(matches!(error, SyncError::AlreadyInLibrary { ref key } if key == "/works/OL123W"));
    assert_eq!(error.to_string(), "Book already in library!");

    assert_eq!(
        fx.backend.calls(),
        vec![MockCall::Save {
            token: "abc".to_string(),
            key: "/works/OL123W".to_string(),
        }]
    );
    assert_eq!(fx.sync.entries().len(), 1);
}

#[tokio::test]
async fn concurrent_saves_of_same_key_send_one_request() {
    let fx = fixture(Some("abc"));
    fx.backend.push_save(MockReply::Ok(dune_entry()));

    let record = dune();
    let (first, second) = tokio::join!(fx.sync.save_entry(&record), fx.sync.save_entry(&record));

    assert!(first.is_ok());
    assert!(matches!(second, Err(SyncError::AlreadyInLibrary { .. })));
    assert_eq!(fx.backend.call_count(), 1);
    assert_eq!(fx.sync.entries().len(), 1);
}

#[tokio::test]
async fn save_without_session_is_refused_locally() {
    let fx = fixture(None);

    let error = fx.sync.save_entry(&dune()).await.expect_err("anonymous save");

    assert!(matches!(error, SyncError::SignInRequired));
    assert_eq!(error.to_string(), "You must sign in to save books!");
    assert_eq!(fx.backend.call_count(), 0);
}

#[tokio::test]
async fn failed_save_leaves_mirror_and_releases_key() {
    let fx = fixture(Some("abc"));
    fx.backend
        .push_save(MockReply::rejected(400, "Book already exists in library"));
    fx.backend.push_save(MockReply::Ok(dune_entry()));

    let error = fx.sync.save_entry(&dune()).await.expect_err("rejected");
    assert_eq!(error.to_string(), "Book already exists in library");
    assert!(fx.sync.entries().is_empty());
    assert!(!fx.sync.mirror().is_pending("/works/OL123W"));

    fx.sync.save_entry(&dune()).await.expect("retry succeeds");
    assert_eq!(fx.backend.call_count(), 2);
}

#[tokio::test]
async fn transport_failure_uses_generic_message() {
    let fx = fixture(Some("abc"));
    fx.backend.push_save(MockReply::Transport);

    let error = fx.sync.save_entry(&dune()).await.expect_err("transport");

    assert!(matches!(
        error,
        SyncError::Transport {
            action: SyncAction::Save,
            ..
        }
    ));
    assert_eq!(error.to_string(), "Failed to save book");
    assert_eq!(fx.sync.session().current_token().as_deref(), Some("abc"));
}

#[tokio::test]
async fn saved_entry_is_listed_and_removed_entry_is_not() {
    let fx = fixture(Some("abc"));
    fx.backend.push_save(MockReply::Ok(dune_entry()));
    fx.backend.push_list(MockReply::Ok(vec![dune_entry()]));
    fx.backend.push_remove(MockReply::Ok(()));
    fx.backend.push_list(MockReply::Ok(Vec::new()));

    let saved = fx.sync.save_entry(&dune()).await.expect("save");
    let listed = fx.sync.list_entries().await.expect("list");
    assert!(listed.iter().any(|entry| entry.id == saved.id));

    let removed = fx.sync.remove_entry("1").await.expect("remove");
    assert_eq!(removed.map(|entry| entry.title), Some("Dune".to_string()));
    assert!(fx.sync.entries().iter().all(|entry| entry.id != "1"));

    let listed = fx.sync.list_entries().await.expect("list again");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn failed_remove_keeps_entry() {
    let fx = fixture(Some("abc"));
    fx.backend.push_list(MockReply::Ok(vec![dune_entry()]));
    fx.backend.push_remove(MockReply::Rejected {
        status: 500,
        message: None,
    });
    fx.sync.list_entries().await.expect("list");

    let error = fx.sync.remove_entry("1").await.expect_err("remove fails");

    assert_eq!(error.to_string(), "Failed to remove book");
    assert_eq!(fx.sync.entries(), vec![dune_entry()]);
}

#[tokio::test]
async fn list_with_expired_token_clears_session() {
    let fx = fixture(Some("expired"));
    fx.backend.push_list(MockReply::Unauthorized);

    let error = fx.sync.list_entries().await.expect_err("401");

    assert!(error.is_session_expired());
    assert_eq!(error.to_string(), "Session expired. Please login again.");
    assert_eq!(fx.sync.session().state(), SessionState::Anonymous);
    assert!(!fx.sync.session().path().exists());
}

#[tokio::test]
async fn unauthorized_save_and_remove_also_expire_session() {
    for operation in ["save", "remove"] {
        let fx = fixture(Some("abc"));
        fx.backend.push_list(MockReply::Ok(vec![dune_entry()]));
        fx.sync.list_entries().await.expect("list");

        let result = match operation {
            "save" => {
                fx.backend.push_save(MockReply::Unauthorized);
                let record = CatalogRecord::new("/works/OL9W", "Emma");
                fx.sync.save_entry(&record).await.map(|_| ())
            }
            _ => {
                fx.backend.push_remove(MockReply::Unauthorized);
                fx.sync.remove_entry("1").await.map(|_| ())
            }
        };

        assert!(
            matches!(result, Err(SyncError::SessionExpired)),
            "{operation} should expire the session"
        );
        assert!(!fx.sync.session().is_authenticated(), "{operation}");
        assert!(fx.sync.entries().is_empty(), "{operation}");
    }
}

#[tokio::test]
async fn unauthorized_profile_expires_session() {
    let fx = fixture(Some("abc"));
    fx.backend.push_list(MockReply::Ok(vec![dune_entry()]));
    fx.backend.push_profile(MockReply::Unauthorized);
    fx.sync.list_entries().await.expect("list");

    let error = fx.sync.profile().await.expect_err("401");

    assert!(matches!(error, SyncError::SessionExpired));
    assert_eq!(fx.sync.session().state(), SessionState::Anonymous);
    assert!(!fx.sync.session().path().exists());
    assert!(fx.sync.entries().is_empty());
    assert_eq!(
        fx.backend.calls().last(),
        Some(&MockCall::Profile {
            token: "abc".to_string()
        })
    );
}

#[tokio::test]
async fn other_failures_do_not_sign_out() {
    let fx = fixture(Some("abc"));
    fx.backend.push_list(MockReply::rejected(403, "Forbidden"));

    let error = fx.sync.list_entries().await.expect_err("403");

    assert_eq!(error.to_string(), "Forbidden");
    assert_eq!(fx.sync.session().current_token().as_deref(), Some("abc"));
}

/// Backend that lets another sign-in complete while its request is in flight.
struct SignInDuringRequest {
    session: SessionHandle,
}

impl LibraryBackend for SignInDuringRequest {
    async fn sign_in(&self, _: &Credentials) -> Result<String, LibraryApiError> {
        unreachable!("not used")
    }

    async fn sign_up(&self, _: &Credentials) -> Result<String, LibraryApiError> {
        unreachable!("not used")
    }

    async fn profile(&self, _: &str) -> Result<Profile, LibraryApiError> {
        unreachable!("not used")
    }

    async fn list_entries(&self, _: &str) -> Result<Vec<LibraryEntry>, LibraryApiError> {
        self.session.set_token("new").expect("new sign in");
        Err(LibraryApiError::Unauthorized { message: None })
    }

    async fn save_entry(&self, _: &str, _: &NewLibraryEntry) -> Result<LibraryEntry, LibraryApiError> {
        unreachable!("not used")
    }

    async fn remove_entry(&self, _: &str, _: &str) -> Result<(), LibraryApiError> {
        unreachable!("not used")
    }
}

#[tokio::test]
async fn late_unauthorized_does_not_undo_new_sign_in() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(&dir.path().join("session.json")).expect("open store");
    store.set_token("old").expect("seed token");
    let session = SessionHandle::new(store);
    let sync = LibrarySync::new(
        SignInDuringRequest {
            session: session.clone(),
        },
        session,
    );

    let error = sync.list_entries().await.expect_err("401 for old token");

    assert!(!error.is_session_expired());
    assert_eq!(sync.session().current_token().as_deref(), Some("new"));
}

#[tokio::test]
async fn sign_in_stores_token_and_validates_input() {
    let fx = fixture(None);

    let error = fx.sync.sign_in("ada", "  ").await.expect_err("blank password");
    assert_eq!(error.to_string(), "Please enter username and password!");
    assert_eq!(fx.backend.call_count(), 0);

    fx.backend.push_sign_in(MockReply::Ok("abc".to_string()));
    fx.sync.sign_in(" ada ", "pw").await.expect("sign in");

    assert_eq!(
        fx.backend.calls(),
        vec![MockCall::SignIn {
            username: "ada".to_string()
        }]
    );
    assert_eq!(
        fx.sync.session().state(),
        SessionState::Authenticated("abc".to_string())
    );
    let reopened = SessionStore::open(&fx.sync.session().path()).expect("reopen");
    assert_eq!(reopened.current_token(), Some("abc"));
}

#[tokio::test]
async fn failed_sign_in_and_sign_up_surface_messages() {
    let fx = fixture(None);
    fx.backend
        .push_sign_in(MockReply::rejected(400, "Invalid credentials"));
    fx.backend.push_sign_up(MockReply::Rejected {
        status: 400,
        message: None,
    });

    let error = fx.sync.sign_in("ada", "pw").await.expect_err("bad login");
    assert_eq!(error.to_string(), "Invalid credentials");

    let error = fx.sync.sign_up("ada", "pw").await.expect_err("bad signup");
    assert_eq!(error.to_string(), "Signup failed");
    assert!(!fx.sync.session().is_authenticated());
}

#[tokio::test]
async fn logout_clears_session_and_mirror() {
    let fx = fixture(Some("abc"));
    fx.backend.push_list(MockReply::Ok(vec![dune_entry()]));
    fx.sync.list_entries().await.expect("list");

    fx.sync.logout().expect("logout");

    assert!(fx.sync.entries().is_empty());
    assert_eq!(fx.sync.session().state(), SessionState::Anonymous);
}
