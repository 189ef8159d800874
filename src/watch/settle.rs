use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Tracks dropped files and reports when they have "settled" (stopped changing).
///
/// A drop can arrive as several create/modify events while the file is still
/// being copied in; only files quiet for the settle duration are released.
pub struct FileSettleTracker {
    /// Map of file path to last change time
    pending: HashMap<PathBuf, Instant>,
    /// How long a file must be unchanged to be considered settled
    settle_duration: Duration,
}

impl FileSettleTracker {
    pub fn new(settle_duration: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            settle_duration,
        }
    }

    /// Record that a file was created or modified
    pub fn file_changed(&mut self, path: PathBuf) {
        self.file_changed_at(path, Instant::now());
    }

    fn file_changed_at(&mut self, path: PathBuf, at: Instant) {
        self.pending.insert(path, at);
    }

    /// Remove and return every settled file, sorted by path.
    ///
    /// Files released by the same call form one batch.
    pub fn take_settled(&mut self) -> Vec<PathBuf> {
        self.take_settled_at(Instant::now())
    }

    fn take_settled_at(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut settled: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, last_change)| now.duration_since(**last_change) >= self.settle_duration)
            .map(|(path, _)| path.clone())
            .collect();

        for path in &settled {
            self.pending.remove(path);
        }
        settled.sort();
        settled
    }

    /// Stop tracking a file (e.g. it was deleted before settling)
    pub fn remove(&mut self, path: &Path) {
        self.pending.remove(path);
    }
}
