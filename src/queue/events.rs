use super::ConversionEntry;
use heicdrop_common::EntryId;
use serde::Serialize;

/// Queue change broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A new entry was created in `Converting`.
    EntryAdded { entry: ConversionEntry },
    /// An entry was converted and saved.
    EntryCompleted { entry: ConversionEntry },
    /// An entry failed.
    EntryFailed {
        id: EntryId,
        file_name: String,
        error: String,
    },
    /// `clear_completed` removed finished entries.
    Cleared { removed: usize },
}

impl QueueEvent {
    pub fn entry_added(entry: ConversionEntry) -> Self {
        QueueEvent::EntryAdded { entry }
    }

    pub fn entry_completed(entry: ConversionEntry) -> Self {
        QueueEvent::EntryCompleted { entry }
    }

    pub fn entry_failed(entry: &ConversionEntry) -> Self {
        QueueEvent::EntryFailed {
            id: entry.id().clone(),
            file_name: entry.file_name().to_string(),
            error: entry.error_message().unwrap_or_default().to_string(),
        }
    }

    pub fn cleared(removed: usize) -> Self {
        QueueEvent::Cleared { removed }
    }
}
