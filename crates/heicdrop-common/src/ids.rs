//! Identifiers for conversion queue entries.
//!
//! An [`EntryId`] is unique for the lifetime of a queue. A [`DedupKey`] is the
//! (file name, last-modified) pair that identifies "probably the same file" and
//! is used to drop duplicate adds while a conversion is still pending.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a source file for duplicate suppression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    /// File name as reported by the trigger source.
    pub file_name: String,
    /// Last-modified timestamp in milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl DedupKey {
    pub fn new(file_name: impl Into<String>, last_modified: i64) -> Self {
        Self {
            file_name: file_name.into(),
            last_modified,
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.file_name, self.last_modified)
    }
}

/// Unique identifier for a conversion queue entry.
///
/// Rendered as `{file_name}-{last_modified}-{disambiguator}`, where the
/// disambiguator is random so re-adding the same file after it was cleared
/// never collides with an earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh entry ID for the given dedup key.
    #[must_use]
    pub fn new(key: &DedupKey) -> Self {
        Self(format!("{}-{}", key, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
