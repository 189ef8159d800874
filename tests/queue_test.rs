//! Conversion queue integration tests.
//!
//! Drives the queue through the intake gateway with scripted capabilities
//! and checks the entry state machine, dedup, clearing, and the resulting
//! saves and notices.

mod common;

use assert_matches::assert_matches;
use bytes::Bytes;
use common::{file, RecordingSaver, ScriptedConverter, TestHarness};
use heicdrop::convert::{TargetFormat, TARGET_QUALITY, UNSUPPORTED_MESSAGE};
use heicdrop::queue::QueueEvent;
use heicdrop_common::{EntryStatus, NoticeKind, TriggerSource};

// ---------------------------------------------------------------------------
// Single file
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_success_saves_jpeg_under_derived_name() {
    let harness = TestHarness::new();

    let outcome = harness
        .gateway
        .accept(vec![file("photo.heic", 10, b"pixels")], TriggerSource::Picker);
    assert_eq!(outcome.accepted, 1);

    harness.queue.wait_idle().await;

    let entries = harness.queue.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status(), EntryStatus::Complete);
    assert_eq!(entries[0].output_name(), Some("photo.jpeg"));
    assert!(entries[0].error_message().is_none());
    assert!(entries[0].finished_at().is_some());

    assert_eq!(
        harness.saver.saved(),
        vec![("photo.jpeg".to_string(), Bytes::from_static(b"jpeg:pixels"))]
    );
    assert!(harness.notifier.notices().is_empty());
}

#[tokio::test]
async fn conversion_requests_jpeg_at_fixed_quality() {
    let harness = TestHarness::new();
    harness.queue.enqueue(file("a.heic", 1, b"x"));
    harness.queue.wait_idle().await;

    assert_eq!(
        harness.converter.calls(),
        vec![(TargetFormat::Jpeg, TARGET_QUALITY)]
    );
    assert!((TARGET_QUALITY - 0.92).abs() < f32::EPSILON);
}

#[tokio::test]
async fn failure_without_cause_uses_fallback_message() {
    let harness = TestHarness::new();
    harness.queue.enqueue(file("empty.heic", 1, b""));
    harness.queue.wait_idle().await;

    let entries = harness.queue.list();
    assert_eq!(entries[0].status(), EntryStatus::Failed);
    assert_eq!(entries[0].error_message(), Some(UNSUPPORTED_MESSAGE));

    let notices = harness.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Failed to convert empty.heic");
    assert_eq!(notices[0].description, UNSUPPORTED_MESSAGE);
}

#[tokio::test]
async fn save_failure_fails_the_entry() {
    let harness =
        TestHarness::with_parts(ScriptedConverter::default(), RecordingSaver::failing("disk full"));
    harness.queue.enqueue(file("a.heic", 1, b"x"));
    harness.queue.wait_idle().await;

    let entries = harness.queue.list();
    assert_eq!(entries[0].status(), EntryStatus::Failed);
    assert_eq!(entries[0].error_message(), Some("disk full"));
    assert!(entries[0].output_name().is_none());

    let notices = harness.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Destructive);
    assert_eq!(notices[0].title, "Failed to convert a.heic");
}

// ---------------------------------------------------------------------------
// Mixed batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mixed_batch_isolates_the_failure() {
    let harness = TestHarness::new();

    harness.gateway.accept(
        vec![
            file("a.heic", 1, b"first"),
            file("b.heic", 2, b"fail:bad header"),
            file("c.heic", 3, b"third"),
        ],
        TriggerSource::Picker,
    );
    harness.queue.wait_idle().await;

    let entries = harness.queue.list();
    let statuses: Vec<(&str, EntryStatus)> = entries
        .iter()
        .map(|e| (e.file_name(), e.status()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("a.heic", EntryStatus::Complete),
            ("b.heic", EntryStatus::Failed),
            ("c.heic", EntryStatus::Complete),
        ]
    );
    assert_eq!(entries[1].error_message(), Some("bad header"));

    let mut saved: Vec<String> = harness.saver.saved().into_iter().map(|(n, _)| n).collect();
    saved.sort();
    assert_eq!(saved, vec!["a.jpeg", "c.jpeg"]);

    let notices = harness.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Failed to convert b.heic");
    assert_eq!(notices[0].description, "bad header");

    let summary = harness.queue.summary();
    assert_eq!(summary.complete, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.is_idle());
}

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_add_while_converting_is_dropped() {
    let (harness, gate) = TestHarness::gated();

    let first = harness.queue.enqueue(file("a.heic", 5, b"x"));
    assert!(first.is_some());
    let second = harness.queue.enqueue(file("a.heic", 5, b"x"));
    assert!(second.is_none());
    assert_eq!(harness.queue.list().len(), 1);

    gate.add_permits(1);
    harness.queue.wait_idle().await;
    assert_eq!(harness.saver.saved().len(), 1);
}

#[tokio::test]
async fn same_name_with_different_timestamp_is_not_a_duplicate() {
    let (harness, gate) = TestHarness::gated();

    assert!(harness.queue.enqueue(file("a.heic", 5, b"x")).is_some());
    assert!(harness.queue.enqueue(file("a.heic", 6, b"x")).is_some());
    assert_eq!(harness.queue.list().len(), 2);

    gate.add_permits(2);
    harness.queue.wait_idle().await;
}

#[tokio::test]
async fn re_add_after_terminal_creates_distinct_entry() {
    let harness = TestHarness::new();

    let first = harness.queue.enqueue(file("a.heic", 5, b"x")).unwrap();
    harness.queue.wait_idle().await;

    let second = harness.queue.enqueue(file("a.heic", 5, b"x")).unwrap();
    assert_ne!(first, second);
    harness.queue.wait_idle().await;

    let entries = harness.queue.list();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status() == EntryStatus::Complete));
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_entry_reaches_exactly_one_terminal_state() {
    let harness = TestHarness::new();
    let mut events = harness.queue.subscribe();

    harness.gateway.accept(
        vec![
            file("a.heic", 1, b"ok"),
            file("b.heic", 2, b"fail:nope"),
        ],
        TriggerSource::Picker,
    );
    harness.queue.wait_idle().await;

    let mut added = 0;
    let mut terminal = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            QueueEvent::EntryAdded { entry } => {
                assert_eq!(entry.status(), EntryStatus::Converting);
                added += 1;
            }
            QueueEvent::EntryCompleted { entry } => terminal.push(entry.id().clone()),
            QueueEvent::EntryFailed { id, .. } => terminal.push(id),
            QueueEvent::Cleared { .. } => panic!("nothing was cleared"),
        }
    }

    assert_eq!(added, 2);
    assert_eq!(terminal.len(), 2);
    assert_ne!(terminal[0], terminal[1]);
}

#[tokio::test]
async fn terminal_status_never_changes() {
    let harness = TestHarness::new();
    harness.queue.enqueue(file("a.heic", 1, b"ok"));
    harness.queue.wait_idle().await;

    let settled = harness.queue.list();
    let mut snapshots = harness.queue.watch_snapshots();
    snapshots.borrow_and_update();

    // other entries coming and going must not touch the finished one
    harness.queue.enqueue(file("b.heic", 2, b"fail:x"));
    harness.queue.wait_idle().await;

    assert!(snapshots.has_changed().unwrap());
    let now = harness.queue.list();
    assert_eq!(now[0].id(), settled[0].id());
    assert_eq!(now[0].status(), EntryStatus::Complete);
    assert_eq!(now[0].finished_at(), settled[0].finished_at());
}

// ---------------------------------------------------------------------------
// Clear completed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clear_completed_keeps_converting_entries() {
    let (harness, gate) = TestHarness::gated();

    harness.queue.enqueue(file("done.heic", 1, b"ok"));
    harness.queue.enqueue(file("broken.heic", 2, b"fail:x"));
    gate.add_permits(2);
    harness.queue.wait_idle().await;

    harness.queue.enqueue(file("pending.heic", 3, b"ok"));
    let mut events = harness.queue.subscribe();

    assert_eq!(harness.queue.clear_completed(), 2);

    let entries = harness.queue.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_name(), "pending.heic");
    assert_eq!(entries[0].status(), EntryStatus::Converting);
    assert_matches!(events.try_recv(), Ok(QueueEvent::Cleared { removed: 2 }));

    gate.add_permits(1);
    harness.queue.wait_idle().await;
    assert_eq!(harness.queue.list()[0].status(), EntryStatus::Complete);
}

#[tokio::test]
async fn clear_completed_with_nothing_finished_is_noop() {
    let (harness, gate) = TestHarness::gated();
    harness.queue.enqueue(file("a.heic", 1, b"ok"));

    let mut snapshots = harness.queue.watch_snapshots();
    snapshots.borrow_and_update();

    assert_eq!(harness.queue.clear_completed(), 0);
    assert!(!snapshots.has_changed().unwrap());
    assert_eq!(harness.queue.list().len(), 1);

    gate.add_permits(1);
    harness.queue.wait_idle().await;
}
