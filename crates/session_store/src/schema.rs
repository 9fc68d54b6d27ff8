use serde::{Deserialize, Serialize};

pub const SESSION_RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRecordType {
    Session,
}

/// On-disk shape of the persisted session slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub record_type: SessionRecordType,
    pub version: u32,
    pub token: String,
    pub saved_at: String,
}

impl SessionRecord {
    #[must_use]
    pub fn v1(token: impl Into<String>, saved_at: impl Into<String>) -> Self {
        Self {
            record_type: SessionRecordType::Session,
            version: SESSION_RECORD_VERSION,
            token: token.into(),
            saved_at: saved_at.into(),
        }
    }
}
