//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a [`ConversionQueue`] and an
//! [`IntakeGateway`] to in-memory capabilities: a [`ScriptedConverter`] whose
//! result is chosen by the input bytes, a [`RecordingSaver`] and a
//! [`RecordingNotifier`].

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use heicdrop::convert::{ConversionOutput, ConvertError, Converter, TargetFormat};
use heicdrop::intake::IntakeGateway;
use heicdrop::notifications::{Notice, Notifier};
use heicdrop::queue::ConversionQueue;
use heicdrop::save::{SaveError, Saver};
use heicdrop::source::FileHandle;

/// Prefix that makes [`ScriptedConverter`] fail with the rest as the cause.
pub const FAIL_PREFIX: &str = "fail:";

/// Converter whose outcome is scripted by the input bytes.
///
/// - input starting with `fail:` fails with the remainder as the cause
/// - empty input fails with no cause
/// - anything else succeeds with `jpeg:<input>`
///
/// With a gate installed every conversion waits for a permit first, which
/// lets a test observe entries while they are still converting.
#[derive(Default)]
pub struct ScriptedConverter {
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<(TargetFormat, f32)>>,
}

impl ScriptedConverter {
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let converter = Self {
            gate: Some(gate.clone()),
            calls: Mutex::new(Vec::new()),
        };
        (converter, gate)
    }

    pub fn calls(&self) -> Vec<(TargetFormat, f32)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Converter for ScriptedConverter {
    async fn convert(
        &self,
        source: Bytes,
        target: TargetFormat,
        quality: f32,
    ) -> Result<ConversionOutput, ConvertError> {
        self.calls.lock().push((target, quality));

        if let Some(ref gate) = self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if source.is_empty() {
            return Err(ConvertError::unknown());
        }
        if let Some(cause) = source.strip_prefix(FAIL_PREFIX.as_bytes()) {
            return Err(ConvertError::new(String::from_utf8_lossy(cause)));
        }

        let mut out = b"jpeg:".to_vec();
        out.extend_from_slice(&source);
        Ok(ConversionOutput::Single(Bytes::from(out)))
    }
}

/// Saver that keeps every save in memory.
#[derive(Default)]
pub struct RecordingSaver {
    saved: Mutex<Vec<(String, Bytes)>>,
    fail_with: Option<String>,
}

impl RecordingSaver {
    pub fn failing(message: &str) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn saved(&self) -> Vec<(String, Bytes)> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl Saver for RecordingSaver {
    async fn save(&self, bytes: Bytes, suggested_name: &str) -> Result<(), SaveError> {
        if let Some(ref message) = self.fail_with {
            return Err(SaveError::new(message.clone()));
        }
        self.saved.lock().push((suggested_name.to_string(), bytes));
        Ok(())
    }
}

/// Notifier that keeps every notice in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Queue and gateway wired to recording capabilities.
pub struct TestHarness {
    pub queue: Arc<ConversionQueue>,
    pub gateway: Arc<IntakeGateway>,
    pub converter: Arc<ScriptedConverter>,
    pub saver: Arc<RecordingSaver>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_parts(ScriptedConverter::default(), RecordingSaver::default())
    }

    /// Harness whose conversions block until permits are added to the gate.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let (converter, gate) = ScriptedConverter::gated();
        (Self::with_parts(converter, RecordingSaver::default()), gate)
    }

    pub fn with_parts(converter: ScriptedConverter, saver: RecordingSaver) -> Self {
        let converter = Arc::new(converter);
        let saver = Arc::new(saver);
        let notifier = Arc::new(RecordingNotifier::default());

        let queue = ConversionQueue::new(converter.clone(), saver.clone(), notifier.clone());
        let gateway = Arc::new(IntakeGateway::new(queue.clone(), notifier.clone()));

        Self {
            queue,
            gateway,
            converter,
            saver,
            notifier,
        }
    }
}

/// In-memory handle with no declared media type.
pub fn file(name: &str, last_modified: i64, body: &[u8]) -> FileHandle {
    FileHandle::from_memory(name, None, last_modified, Bytes::copy_from_slice(body))
}

/// In-memory handle with a declared media type.
pub fn typed_file(name: &str, media_type: &str, body: &[u8]) -> FileHandle {
    FileHandle::from_memory(
        name,
        Some(media_type.to_string()),
        1,
        Bytes::copy_from_slice(body),
    )
}
