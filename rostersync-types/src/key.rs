//! Roster entries and the store's composite key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key of a stored record: `(ID, Username)`.
///
/// Ordered by `id` first so keys sort the way the roster lists them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Username")]
    pub username: String,
}

impl RecordKey {
    /// Creates a key from its two parts.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Parses a key from its `id/username` display form.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.split_once('/') {
            Some((id, username)) if !id.is_empty() => Ok(Self::new(id, username)),
            _ => Err(crate::Error::InvalidKey(s.to_string())),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.username)
    }
}

/// A roster entry as returned by the remote source.
///
/// Immutable once fetched; uniquely identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
}

impl Entity {
    /// Creates a new roster entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Returns the store key this entity's detail record is persisted under.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.id, &self.name)
    }
}
