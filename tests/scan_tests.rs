mod common;
use common::{ScriptedCapture, pool_with_session};
use rollcall::core::lifecycle::LifecycleLogic;
use rollcall::errors::AppError;
use rollcall::models::status::AttendanceStatus;
use rollcall::scan::{
    CaptureError, Clock, Frame, READY_TEXT, ScanPipeline, ScanSettings, ScanSignal, StatusBoard,
    StatusKind, TextDecoder,
};
use chrono::{NaiveDate, TimeDelta};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn settings(poll_ms: u64, debounce_ms: u64) -> ScanSettings {
    ScanSettings {
        poll_interval: Duration::from_millis(poll_ms),
        debounce_window: Duration::from_millis(debounce_ms),
        status_clear_after: Duration::from_millis(2000),
    }
}

async fn drain(handle: &mut rollcall::scan::ScanHandle) -> Vec<ScanSignal> {
    let mut out = Vec::new();
    while let Some(s) = handle.next_signal().await {
        out.push(s);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_repeated_code_is_debounced_within_window() {
    let (pool, session) = pool_with_session();
    let pool = pool.into_shared();

    // one frame per 100ms tick: P1 at 0ms and 100ms, blanks, P1 again at 1200ms
    let mut lines = vec!["P1", "P1"];
    lines.extend(std::iter::repeat_n("", 10));
    lines.push("P1");

    let pipeline = ScanPipeline::new(
        pool.clone(),
        session.id,
        ScriptedCapture::lines(&lines),
        TextDecoder,
        settings(100, 1000),
    );
    let mut handle = pipeline.start().unwrap();
    let signals = drain(&mut handle).await;
    let report = handle.stop().await.unwrap();

    assert_eq!(report.frames, 13);
    assert_eq!(report.marked, 2);
    assert_eq!(report.debounced, 1);
    assert_eq!(
        signals
            .iter()
            .filter(|s| matches!(s, ScanSignal::MarkedPresent { .. }))
            .count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_scan_marks_present_and_reports_unknown() {
    let (pool, session) = pool_with_session();
    let pool = pool.into_shared();

    let pipeline = ScanPipeline::new(
        pool.clone(),
        session.id,
        ScriptedCapture::lines(&["P2\n", "GHOST\n", "P3;P1\n"]),
        TextDecoder,
        settings(30, 3000),
    );
    let mut handle = pipeline.start().unwrap();
    let signals = drain(&mut handle).await;
    let report = handle.stop().await.unwrap();

    assert_eq!(report.marked, 3);
    assert_eq!(report.unknown, 1);
    assert_eq!(report.decoded, 4);

    match &signals[0] {
        ScanSignal::MarkedPresent { name, entry } => {
            assert_eq!(name, "Ben");
            assert_eq!(entry.person_id, "P2");
            assert_eq!(entry.status, AttendanceStatus::Present);
            assert!(entry.timestamp.is_some());
        }
        other => panic!("unexpected signal {other:?}"),
    }
    assert_eq!(signals[1], ScanSignal::UnknownIdentifier("GHOST".into()));

    let entries = LifecycleLogic::list_entries_for_session(&pool.lock(), session.id).unwrap();
    assert!(
        entries
            .iter()
            .all(|v| v.entry.status == AttendanceStatus::Present)
    );
}

#[tokio::test(start_paused = true)]
async fn test_unknown_code_leaves_entries_untouched() {
    let (pool, session) = pool_with_session();
    let before = LifecycleLogic::list_entries_for_session(&pool, session.id).unwrap();
    let pool = pool.into_shared();

    let pipeline = ScanPipeline::new(
        pool.clone(),
        session.id,
        ScriptedCapture::lines(&["X9", "X9"]),
        TextDecoder,
        settings(30, 3000),
    );
    let mut handle = pipeline.start().unwrap();
    let signals = drain(&mut handle).await;
    let report = handle.stop().await.unwrap();

    // unknown codes are not debounced
    assert_eq!(report.unknown, 2);
    assert_eq!(signals.len(), 2);

    let after = LifecycleLogic::list_entries_for_session(&pool.lock(), session.id).unwrap();
    assert_eq!(before, after);
}

#[tokio::test(start_paused = true)]
async fn test_device_that_cannot_open_prevents_start() {
    let (pool, session) = pool_with_session();
    let device = ScriptedCapture::failing_open();

    let res = ScanPipeline::new(
        pool.into_shared(),
        session.id,
        device,
        TextDecoder,
        settings(30, 3000),
    )
    .start();

    assert!(matches!(res, Err(AppError::CameraUnavailable(_))));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_session_prevents_start() {
    let (pool, _) = pool_with_session();
    let device = ScriptedCapture::lines(&["P1"]);
    let released = device.released_flag();

    let res = ScanPipeline::new(pool.into_shared(), 999, device, TextDecoder, settings(30, 3000))
        .start();

    assert!(matches!(res, Err(AppError::SessionNotFound(999))));
    assert!(!released.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_frame_does_not_stop_scanning() {
    let (pool, session) = pool_with_session();

    let device = ScriptedCapture::script(vec![
        Err(CaptureError::Unreadable("sensor glitch".into())),
        Ok(Frame::new("P1")),
        Ok(Frame::new(vec![0xff, 0xfe])),
        Ok(Frame::new("P2")),
    ]);
    let pipeline = ScanPipeline::new(
        pool.into_shared(),
        session.id,
        device,
        TextDecoder,
        settings(30, 3000),
    );
    let mut handle = pipeline.start().unwrap();
    let signals = drain(&mut handle).await;
    let report = handle.stop().await.unwrap();

    assert!(matches!(signals[0], ScanSignal::CameraUnavailable(_)));
    assert_eq!(report.capture_errors, 1);
    assert_eq!(report.frames, 3);
    assert_eq!(report.marked, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_releases_device_while_waiting_for_frame() {
    let (pool, session) = pool_with_session();
    let device = ScriptedCapture::lines(&["P1"]).hold_open();
    let released = device.released_flag();

    let pipeline = ScanPipeline::new(
        pool.into_shared(),
        session.id,
        device,
        TextDecoder,
        settings(30, 3000),
    );
    let mut handle = pipeline.start().unwrap();

    assert!(matches!(
        handle.next_signal().await,
        Some(ScanSignal::MarkedPresent { .. })
    ));
    assert!(!released.load(Ordering::SeqCst));

    let report = handle.stop().await.unwrap();
    assert_eq!(report.marked, 1);
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn test_status_clears_back_to_ready() {
    let board = StatusBoard::new(Duration::from_millis(2000));
    let rx = board.subscribe();
    assert_eq!(rx.borrow().kind, StatusKind::Ready);
    assert_eq!(rx.borrow().text, READY_TEXT);

    board.post(StatusKind::Success, "Scanned: P1 (Ann) marked as Present");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(board.current().kind, StatusKind::Success);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(board.current().kind, StatusKind::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_newer_status_is_not_cleared_by_older_timer() {
    let board = StatusBoard::new(Duration::from_millis(2000));

    board.post(StatusKind::Warning, "Unknown ID: X");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let newer = board.post(StatusKind::Success, "Scanned: P1 (Ann) marked as Present");

    // first timer fires at 2000ms, the second one is due at 3500ms
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let current = board.current();
    assert_eq!(current.generation, newer);
    assert_eq!(current.kind, StatusKind::Success);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(board.current().kind, StatusKind::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_clear() {
    let board = StatusBoard::new(Duration::from_millis(500));
    board.post(StatusKind::Error, "Camera unavailable");
    board.shutdown();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(board.current().kind, StatusKind::Error);
}

#[tokio::test(start_paused = true)]
async fn test_seminar_scenario_end_to_end() {
    use rollcall::core::filter::filter_entries;
    use rollcall::models::status::StatusFilter;

    let mut pool = common::open_pool();
    common::add_people(&pool, &[("P1", "Ann"), ("P2", "Ben")]);
    let ev = LifecycleLogic::create_event(&pool, "Seminar").unwrap();
    let session = LifecycleLogic::create_session(&mut pool, ev.id, "Morning").unwrap();
    let pool = pool.into_shared();

    // scan time follows the paused tokio clock from 09:00
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    let started = tokio::time::Instant::now();
    let clock: Clock = Arc::new(move || base + TimeDelta::from_std(started.elapsed()).unwrap());

    // P1 at 0ms, P1 again at 1200ms (window is 1s), then an unknown id
    let mut lines = vec!["P1"];
    lines.extend(std::iter::repeat_n("", 11));
    lines.extend(["P1", "P9"]);

    let pipeline = ScanPipeline::new(
        pool.clone(),
        session.id,
        ScriptedCapture::lines(&lines),
        TextDecoder,
        settings(100, 1000),
    )
    .with_clock(clock);
    let mut handle = pipeline.start().unwrap();
    let signals = drain(&mut handle).await;
    handle.stop().await.unwrap();

    let stamps: Vec<_> = signals
        .iter()
        .filter_map(|s| match s {
            ScanSignal::MarkedPresent { entry, .. } => entry.timestamp,
            _ => None,
        })
        .collect();
    assert_eq!(stamps, vec![base, base + TimeDelta::milliseconds(1200)]);
    assert_eq!(
        signals.last(),
        Some(&ScanSignal::UnknownIdentifier("P9".into()))
    );

    let entries = LifecycleLogic::list_entries_for_session(&pool.lock(), session.id).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].entry.status, AttendanceStatus::Present);
    assert_eq!(entries[0].entry.timestamp, Some(stamps[1]));
    assert_eq!(entries[1].entry.status, AttendanceStatus::Absent);
    assert_eq!(entries[1].entry.timestamp, None);

    let ben: Vec<_> = filter_entries(&entries, "ben", StatusFilter::All).collect();
    assert_eq!(ben.len(), 1);
    assert_eq!(ben[0].person.id, "P2");

    let present: Vec<_> =
        filter_entries(&entries, "", StatusFilter::Only(AttendanceStatus::Present)).collect();
    assert_eq!(present.len(), 1);
    assert_eq!(present[0].person.id, "P1");
}

#[tokio::test(start_paused = true)]
async fn test_line_capture_reads_until_end_of_feed() {
    use rollcall::scan::LineCapture;

    let (pool, session) = pool_with_session();
    let feed: &'static [u8] = b"P1\r\n\nP2;P3\n";

    let pipeline = ScanPipeline::new(
        pool.into_shared(),
        session.id,
        LineCapture::from_reader(feed),
        TextDecoder,
        settings(30, 3000),
    );
    let mut handle = pipeline.start().unwrap();
    drain(&mut handle).await;
    let report = handle.stop().await.unwrap();

    assert_eq!(report.frames, 3);
    assert_eq!(report.marked, 3);
    assert_eq!(report.capture_errors, 0);
}
