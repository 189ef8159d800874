//! Conversion queue.
//!
//! Tracks one [`ConversionEntry`] per accepted file and drives each through
//! `Converting -> Complete | Failed`:
//!
//! - [`ConversionQueue::enqueue`] creates the entry and spawns an independent
//!   task that converts, saves, and records the outcome
//! - [`ConversionQueue::clear_completed`] drops every finished entry
//! - [`ConversionQueue::list`] returns the entries in insertion order
//!
//! Every mutation happens under one mutex and publishes a fresh immutable
//! snapshot on a watch channel, so readers never observe a half-applied
//! change. There is no concurrency cap, no cancellation, and no timeout.

mod events;
mod types;

pub use events::QueueEvent;
pub use types::{ConversionEntry, QueueSummary};

use crate::convert::{ConvertError, Converter, TargetFormat, TARGET_QUALITY};
use crate::notifications::{Notice, Notifier};
use crate::save::Saver;
use crate::source::FileHandle;
use heicdrop_common::paths::output_file_name;
use heicdrop_common::{EntryId, EntryStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Immutable view of the queue at one point in time.
pub type Snapshot = Arc<[ConversionEntry]>;

pub struct ConversionQueue {
    entries: Mutex<Vec<ConversionEntry>>,
    snapshot_tx: watch::Sender<Snapshot>,
    event_tx: broadcast::Sender<QueueEvent>,
    converter: Arc<dyn Converter>,
    saver: Arc<dyn Saver>,
    notifier: Arc<dyn Notifier>,
}

impl ConversionQueue {
    pub fn new(
        converter: Arc<dyn Converter>,
        saver: Arc<dyn Saver>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(Snapshot::from(Vec::new()));
        let (event_tx, _) = broadcast::channel(256);

        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            snapshot_tx,
            event_tx,
            converter,
            saver,
            notifier,
        })
    }

    /// Add a file and start converting it.
    ///
    /// Returns `None` without touching the queue when an entry for the same
    /// (name, last-modified) pair is still converting. Otherwise the new entry
    /// is visible in [`list`](Self::list) before this returns, while the
    /// conversion itself runs on a spawned task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(self: &Arc<Self>, file: FileHandle) -> Option<EntryId> {
        let entry = self.insert(file)?;
        let id = entry.id().clone();

        tracing::info!("Queued {} as {}", entry.file_name(), id);
        self.broadcast(QueueEvent::entry_added(entry.clone()));

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            queue.run(entry).await;
        });

        Some(id)
    }

    /// Dedup check and insertion under a single lock acquisition.
    fn insert(&self, file: FileHandle) -> Option<ConversionEntry> {
        let key = file.dedup_key();
        let mut entries = self.entries.lock();

        if entries.iter().any(|e| e.is_pending_for(&key)) {
            tracing::debug!("Ignoring duplicate add for {} while it converts", key);
            return None;
        }

        let entry = ConversionEntry::new(file);
        entries.push(entry.clone());
        self.publish(&entries);
        Some(entry)
    }

    async fn run(&self, entry: ConversionEntry) {
        let outcome = self.convert_and_save(entry.source()).await;

        match outcome {
            Ok(output_name) => {
                let updated = self.transition(entry.id(), |e| e.complete(output_name));
                if let Some(updated) = updated {
                    tracing::info!("Converted {}", updated.file_name());
                    self.broadcast(QueueEvent::entry_completed(updated));
                }
            }
            Err(err) => {
                let message = err.message().to_string();
                tracing::warn!("Failed to convert {}: {}", entry.file_name(), message);

                let updated = self.transition(entry.id(), |e| e.fail(message.clone()));
                if let Some(updated) = updated {
                    self.broadcast(QueueEvent::entry_failed(&updated));
                }

                self.notifier.notify(Notice::destructive(
                    format!("Failed to convert {}", entry.file_name()),
                    message,
                ));
            }
        }
    }

    /// Convert, keep the first image, and save it. Returns the saved name.
    async fn convert_and_save(&self, file: &FileHandle) -> Result<String, ConvertError> {
        let source = file
            .read()
            .await
            .map_err(|e| ConvertError::new(e.to_string()))?;

        let output = self
            .converter
            .convert(source, TargetFormat::Jpeg, TARGET_QUALITY)
            .await?;
        let image = output.into_primary().ok_or_else(ConvertError::unknown)?;

        let output_name = output_file_name(file.name());
        self.saver
            .save(image, &output_name)
            .await
            .map_err(|e| ConvertError::new(e.to_string()))?;

        Ok(output_name)
    }

    /// Apply a status change to one entry and publish it.
    ///
    /// Returns the updated entry, or `None` if it is gone or refused the
    /// change because it was already terminal.
    fn transition<F>(&self, id: &EntryId, apply: F) -> Option<ConversionEntry>
    where
        F: FnOnce(&mut ConversionEntry) -> bool,
    {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.iter_mut().find(|e| e.id() == id) else {
            tracing::warn!("Entry {} vanished before its conversion finished", id);
            return None;
        };

        if !apply(entry) {
            tracing::warn!("Entry {} is already {}, ignoring transition", id, entry.status());
            return None;
        }

        let updated = entry.clone();
        self.publish(&entries);
        Some(updated)
    }

    /// Remove every entry that is not converting. Returns how many were removed.
    pub fn clear_completed(&self) -> usize {
        let removed = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|e| e.status() == EntryStatus::Converting);
            let removed = before - entries.len();
            if removed > 0 {
                self.publish(&entries);
            }
            removed
        };

        if removed > 0 {
            tracing::info!("Cleared {} finished entries", removed);
            self.broadcast(QueueEvent::cleared(removed));
        }
        removed
    }

    /// Entries in insertion order.
    pub fn list(&self) -> Snapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn summary(&self) -> QueueSummary {
        QueueSummary::from_entries(&self.list())
    }

    /// Subscribe to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_tx.subscribe()
    }

    /// Receive every new snapshot as it is published.
    pub fn watch_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Wait until no entry is converting.
    pub async fn wait_idle(&self) {
        let mut rx = self.snapshot_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx
            .wait_for(|snapshot| snapshot.iter().all(|e| e.status().is_terminal()))
            .await;
    }

    fn publish(&self, entries: &[ConversionEntry]) {
        self.snapshot_tx.send_replace(Snapshot::from(entries.to_vec()));
    }

    fn broadcast(&self, event: QueueEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No subscribers for queue event");
        }
    }
}
