//! Drop folder: the drag-and-drop trigger source.
//!
//! Files created in (or moved into) the watched directory are tracked until
//! they stop changing, then handed to the [`IntakeGateway`] as one batch per
//! poll. The watcher does no filtering of its own.

pub mod settle;

pub use settle::FileSettleTracker;

use crate::config::WatchConfig;
use crate::intake::IntakeGateway;
use crate::source::FileHandle;
use anyhow::{Context, Result};
use heicdrop_common::TriggerSource;
use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What the watch callback forwards to the settle loop.
#[derive(Debug)]
enum DropEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

/// Directory watcher feeding dropped files to the intake gateway.
pub struct DropFolderWatcher {
    dir: PathBuf,
    config: WatchConfig,
    gateway: Arc<IntakeGateway>,
    watcher: Option<RecommendedWatcher>,
    task: Option<JoinHandle<()>>,
}

impl DropFolderWatcher {
    pub fn new(dir: PathBuf, config: WatchConfig, gateway: Arc<IntakeGateway>) -> Self {
        Self {
            dir,
            config,
            gateway,
            watcher: None,
            task: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start watching. Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if !self.dir.is_dir() {
            anyhow::bail!("Drop folder does not exist: {:?}", self.dir);
        }

        let (event_tx, mut event_rx) = mpsc::channel::<DropEvent>(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    for drop_event in classify(event) {
                        let _ = event_tx.blocking_send(drop_event);
                    }
                }
                Err(e) => tracing::warn!("Drop folder watch error: {}", e),
            },
            Config::default(),
        )
        .context("Failed to create file watcher")?;

        // Non-recursive: only direct drops count
        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch path: {:?}", self.dir))?;
        tracing::info!("Watching drop folder: {:?}", self.dir);

        self.watcher = Some(watcher);

        let gateway = self.gateway.clone();
        let settle = Duration::from_secs(self.config.settle_time_secs);
        let poll = Duration::from_millis(self.config.poll_interval_ms);

        self.task = Some(tokio::spawn(async move {
            let mut tracker = FileSettleTracker::new(settle);
            let mut check_interval = tokio::time::interval(poll);

            loop {
                tokio::select! {
                    event = event_rx.recv() => {
                        match event {
                            Some(DropEvent::Changed(path)) => {
                                tracing::debug!("Drop folder event: {:?}", path);
                                tracker.file_changed(path);
                            }
                            Some(DropEvent::Removed(path)) => tracker.remove(&path),
                            // watcher dropped
                            None => break,
                        }
                    }

                    _ = check_interval.tick() => {
                        let settled = tracker.take_settled();
                        if !settled.is_empty() {
                            release_batch(&gateway, settled).await;
                        }
                    }
                }
            }

            tracing::debug!("Drop folder loop stopped");
        }));

        Ok(())
    }

    /// Stop watching
    pub fn stop(&mut self) {
        self.watcher = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::info!("Drop folder watcher stopped");
    }
}

impl Drop for DropFolderWatcher {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn classify(event: Event) -> Vec<DropEvent> {
    match event.kind {
        EventKind::Create(_) => event.paths.into_iter().map(DropEvent::Changed).collect(),
        // A rename reports both ends; keep whichever still exists
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .into_iter()
            .map(|p| {
                if p.exists() {
                    DropEvent::Changed(p)
                } else {
                    DropEvent::Removed(p)
                }
            })
            .collect(),
        EventKind::Modify(_) => event.paths.into_iter().map(DropEvent::Changed).collect(),
        EventKind::Remove(_) => event.paths.into_iter().map(DropEvent::Removed).collect(),
        _ => Vec::new(),
    }
}

/// Turn settled paths into handles and hand them over as one batch.
async fn release_batch(gateway: &IntakeGateway, paths: Vec<PathBuf>) {
    let mut batch = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_file() {
            continue;
        }
        match FileHandle::from_path(&path).await {
            Ok(handle) => batch.push(handle),
            Err(e) => tracing::warn!("Skipping dropped file {:?}: {}", path, e),
        }
    }

    if batch.is_empty() {
        return;
    }

    let outcome = gateway.accept(batch, TriggerSource::DropFolder);
    tracing::info!(
        "Drop folder batch: {} accepted, {} rejected",
        outcome.accepted,
        outcome.rejected
    );
}
