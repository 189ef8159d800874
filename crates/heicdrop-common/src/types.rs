//! Core type definitions for queue entries, notices, and intake.
//!
//! All enums are serialized in lowercase so JSON snapshots read the same way
//! the console table does.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversion status of a queue entry.
///
/// `Converting` is the only non-terminal state. An entry moves to `Complete`
/// or `Failed` exactly once and never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Conversion dispatched, result pending.
    Converting,
    /// Converted and saved.
    Complete,
    /// Conversion or save failed.
    Failed,
}

impl EntryStatus {
    /// Whether no further transitions are possible from this status.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Converting => false,
            Self::Complete | Self::Failed => true,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converting => write!(f, "converting"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Visual weight of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// Informational.
    Info,
    /// Something the user asked for did not happen.
    Destructive,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Destructive => write!(f, "destructive"),
        }
    }
}

/// Where a batch of candidate files came from.
///
/// Both sources are filtered identically; the source only shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// Files named explicitly by the user.
    Picker,
    /// Files released into the watched drop folder.
    DropFolder,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Picker => write!(f, "picker"),
            Self::DropFolder => write!(f, "drop_folder"),
        }
    }
}
