//! Intake gateway.
//!
//! Every trigger source (explicit picks, drop folder) hands its batch to
//! [`IntakeGateway::accept`], so filtering is identical no matter where the
//! files came from.

use crate::notifications::{Notice, Notifier};
use crate::queue::ConversionQueue;
use crate::source::FileHandle;
use heicdrop_common::paths::{has_heic_extension, is_heic_media_type};
use heicdrop_common::TriggerSource;
use std::sync::Arc;

pub const NO_FILES_TITLE: &str = "No HEIC files found";
pub const NO_FILES_DESCRIPTION: &str = "Please select files with a .heic extension.";

/// What happened to a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeOutcome {
    /// Qualifying files forwarded to the queue.
    pub accepted: usize,
    /// Files dropped by the filter.
    pub rejected: usize,
}

/// Whether a candidate is a HEIC file, by name or declared media type.
pub fn is_qualifying(file: &FileHandle) -> bool {
    has_heic_extension(file.name()) || is_heic_media_type(file.media_type())
}

/// Split a batch into qualifying files and the number rejected.
pub fn filter_qualifying(candidates: Vec<FileHandle>) -> (Vec<FileHandle>, usize) {
    let total = candidates.len();
    let qualifying: Vec<FileHandle> = candidates.into_iter().filter(is_qualifying).collect();
    let rejected = total - qualifying.len();
    (qualifying, rejected)
}

pub struct IntakeGateway {
    queue: Arc<ConversionQueue>,
    notifier: Arc<dyn Notifier>,
}

impl IntakeGateway {
    pub fn new(queue: Arc<ConversionQueue>, notifier: Arc<dyn Notifier>) -> Self {
        Self { queue, notifier }
    }

    pub fn queue(&self) -> &Arc<ConversionQueue> {
        &self.queue
    }

    /// Filter a batch and enqueue each qualifying file independently.
    ///
    /// A batch with no qualifying file produces one notice and leaves the
    /// queue untouched.
    pub fn accept(&self, candidates: Vec<FileHandle>, source: TriggerSource) -> IntakeOutcome {
        let (qualifying, rejected) = filter_qualifying(candidates);

        if qualifying.is_empty() {
            tracing::info!("No HEIC files in {} batch of {}", source, rejected);
            self.notifier
                .notify(Notice::destructive(NO_FILES_TITLE, NO_FILES_DESCRIPTION));
            return IntakeOutcome {
                accepted: 0,
                rejected,
            };
        }

        if rejected > 0 {
            tracing::debug!("Skipped {} non-HEIC files from {}", rejected, source);
        }

        let accepted = qualifying.len();
        for file in qualifying {
            self.queue.enqueue(file);
        }

        tracing::debug!("Accepted {} files from {}", accepted, source);
        IntakeOutcome { accepted, rejected }
    }
}
