use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::SessionStoreError;
use crate::paths::temp_path_for;
use crate::schema::{SessionRecord, SESSION_RECORD_VERSION};

/// Session validity as seen by every authenticated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated(String),
    Anonymous,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    token: Option<String>,
}

impl SessionStore {
    /// Opens the slot at `path`. A missing file is a signed-out session.
    pub fn open(path: &Path) -> Result<Self, SessionStoreError> {
        let path = path.to_path_buf();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no persisted session");
                return Ok(Self { path, token: None });
            }
            Err(source) => {
                return Err(SessionStoreError::io("reading session file", &path, source));
            }
        };

        let record = parse_record(&path, &raw)?;
        validate_record(&path, &record)?;

        Ok(Self {
            path,
            token: Some(record.token),
        })
    }

    /// Opens the slot, discarding a record that cannot be read back.
    ///
    /// I/O failures other than a corrupt record still surface as errors.
    pub fn open_or_reset(path: &Path) -> Result<Self, SessionStoreError> {
        match Self::open(path) {
            Ok(store) => Ok(store),
            Err(error @ SessionStoreError::Io { .. }) => Err(error),
            Err(error) => {
                warn!(%error, "discarding unreadable session record");
                let mut store = Self {
                    path: path.to_path_buf(),
                    token: None,
                };
                store.clear_token()?;
                Ok(store)
            }
        }
    }

    /// Replaces the current token and persists it before returning.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), SessionStoreError> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionStoreError::BlankToken);
        }

        let saved_at = now_rfc3339()?;
        let record = SessionRecord::v1(token, saved_at);
        write_record(&self.path, &record)?;
        self.token = Some(record.token);
        debug!(path = %self.path.display(), "session token stored");
        Ok(())
    }

    /// Forgets the in-memory token first, then removes the persisted slot.
    pub fn clear_token(&mut self) -> Result<(), SessionStoreError> {
        self.token = None;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session token cleared");
                Ok(())
            }
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStoreError::io(
                "removing session file",
                &self.path,
                source,
            )),
        }
    }

    #[must_use]
    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        match &self.token {
            Some(token) => SessionState::Authenticated(token.clone()),
            None => SessionState::Anonymous,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn parse_record(path: &Path, raw: &str) -> Result<SessionRecord, SessionStoreError> {
    serde_json::from_str::<SessionRecord>(raw)
        .map_err(|source| SessionStoreError::json_parse(path, source))
}

pub(crate) fn validate_record(path: &Path, record: &SessionRecord) -> Result<(), SessionStoreError> {
    if record.version != SESSION_RECORD_VERSION {
        return Err(SessionStoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: record.version,
        });
    }

    if record.token.trim().is_empty() {
        return Err(SessionStoreError::EmptyToken {
            path: path.to_path_buf(),
        });
    }

    if OffsetDateTime::parse(&record.saved_at, &Rfc3339).is_err() {
        return Err(SessionStoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            field: "saved_at",
            value: record.saved_at.clone(),
        });
    }

    Ok(())
}

fn write_record(path: &Path, record: &SessionRecord) -> Result<(), SessionStoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| SessionStoreError::io("creating session directory", parent, source))?;
    }

    let body = serde_json::to_string(record)
        .map_err(|source| SessionStoreError::json_serialize(path, source))?;
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, body)
        .map_err(|source| SessionStoreError::io("writing session file", &temp_path, source))?;
    fs::rename(&temp_path, path)
        .map_err(|source| SessionStoreError::io("replacing session file", path, source))
}

fn now_rfc3339() -> Result<String, SessionStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(SessionStoreError::ClockFormat)
}
