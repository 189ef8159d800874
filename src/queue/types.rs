use crate::source::FileHandle;
use chrono::{DateTime, Utc};
use heicdrop_common::{DedupKey, EntryId, EntryStatus};
use serde::Serialize;

/// One tracked conversion attempt for one input file.
///
/// Fields are only reachable through getters; status changes go through
/// [`ConversionEntry::complete`] and [`ConversionEntry::fail`], which refuse
/// to leave a terminal status.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionEntry {
    id: EntryId,
    source: FileHandle,
    status: EntryStatus,
    error_message: Option<String>,
    output_name: Option<String>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ConversionEntry {
    pub(crate) fn new(source: FileHandle) -> Self {
        let id = EntryId::new(&source.dedup_key());
        Self {
            id,
            source,
            status: EntryStatus::Converting,
            error_message: None,
            output_name: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn source(&self) -> &FileHandle {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        self.source.name()
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Present only when the entry failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Name the converted image was handed to the saver under, once complete.
    pub fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn dedup_key(&self) -> DedupKey {
        self.source.dedup_key()
    }

    /// Whether this entry blocks a new add for `key`.
    pub fn is_pending_for(&self, key: &DedupKey) -> bool {
        self.status == EntryStatus::Converting
            && self.source.name() == key.file_name
            && self.source.last_modified() == key.last_modified
    }

    /// Converting -> Complete. Returns false if the entry was already terminal.
    pub(crate) fn complete(&mut self, output_name: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = EntryStatus::Complete;
        self.output_name = Some(output_name.into());
        self.finished_at = Some(Utc::now());
        true
    }

    /// Converting -> Failed. Returns false if the entry was already terminal.
    pub(crate) fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = EntryStatus::Failed;
        self.error_message = Some(message.into());
        self.finished_at = Some(Utc::now());
        true
    }
}

/// Entry counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    pub converting: usize,
    pub complete: usize,
    pub failed: usize,
}

impl QueueSummary {
    pub fn from_entries(entries: &[ConversionEntry]) -> Self {
        entries
            .iter()
            .fold(Self::default(), |mut summary, entry| {
                match entry.status() {
                    EntryStatus::Converting => summary.converting += 1,
                    EntryStatus::Complete => summary.complete += 1,
                    EntryStatus::Failed => summary.failed += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.converting + self.complete + self.failed
    }

    /// Entries that `clear_completed` would remove.
    pub fn finished(&self) -> usize {
        self.complete + self.failed
    }

    pub fn is_idle(&self) -> bool {
        self.converting == 0
    }
}
