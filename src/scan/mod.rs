//! Scan ingestion pipeline.
//!
//! A periodic task acquires frames from a [`CaptureDevice`], decodes them,
//! debounces repeated codes, and marks matching people present through
//! [`AttendanceLogic::set_status_at`], stamped by the pipeline's [`Clock`]. Per-scan failures are reported as
//! [`ScanSignal`]s and never end the loop; only a device that fails to open
//! prevents scanning from starting.

pub mod capture;
pub mod debounce;
pub mod decoder;
pub mod status;

pub use capture::{CaptureDevice, CaptureError, Frame, LineCapture};
pub use debounce::Debouncer;
pub use decoder::{DecodeError, Decoder, TextDecoder};
pub use status::{READY_TEXT, StatusBoard, StatusKind, StatusMessage};

use crate::config::ScanConfig;
use crate::core::attendance::AttendanceLogic;
use crate::core::lifecycle::LifecycleLogic;
use crate::db::log::audit;
use crate::db::pool::{DbPool, SharedPool};
use crate::db::queries::load_entry_view;
use crate::errors::{AppError, AppResult};
use crate::models::entry::{Entry, EntryKey};
use crate::models::status::AttendanceStatus;
use capture::DeviceGuard;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Timing knobs of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
    pub status_clear_after: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanSettings {
    fn from(cfg: &ScanConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(cfg.poll_interval_ms.max(1)),
            debounce_window: Duration::from_millis(cfg.debounce_ms),
            status_clear_after: Duration::from_millis(cfg.status_clear_ms),
        }
    }
}

/// Source of the timestamps written on accepted scans.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Local wall-clock time.
pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Outcome of one decoded code, or of a failed acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSignal {
    MarkedPresent { name: String, entry: Entry },
    UnknownIdentifier(String),
    CameraUnavailable(String),
}

/// Counters accumulated over a scanning run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub frames: usize,
    pub capture_errors: usize,
    pub decoded: usize,
    pub marked: usize,
    pub unknown: usize,
    pub debounced: usize,
}

pub struct ScanPipeline<C, D> {
    pool: SharedPool,
    session_id: i64,
    device: C,
    decoder: D,
    settings: ScanSettings,
    clock: Clock,
}

impl<C: CaptureDevice, D: Decoder> ScanPipeline<C, D> {
    pub fn new(
        pool: SharedPool,
        session_id: i64,
        device: C,
        decoder: D,
        settings: ScanSettings,
    ) -> Self {
        Self {
            pool,
            session_id,
            device,
            decoder,
            settings,
            clock: system_clock(),
        }
    }

    /// Replace the timestamp source (the local clock by default).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Open the device and spawn the polling task.
    ///
    /// Fails with `SessionNotFound` for an unknown session and with
    /// `CameraUnavailable` when the device cannot be opened; in both cases no
    /// task is started. Must be called from within a tokio runtime.
    pub fn start(self) -> AppResult<ScanHandle> {
        let ScanPipeline {
            pool,
            session_id,
            mut device,
            decoder,
            settings,
            clock,
        } = self;

        LifecycleLogic::get_session(&pool.lock(), session_id)?;

        device
            .open()
            .map_err(|e| AppError::CameraUnavailable(e.to_string()))?;
        let device = DeviceGuard::new(device);

        let cancel = CancellationToken::new();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let board = StatusBoard::new(settings.status_clear_after);
        let status_rx = board.subscribe();

        audit(
            &pool.lock().conn,
            "scan_start",
            &session_id.to_string(),
            "Scanning started",
        );
        info!(session_id, ?settings, "scan started");

        let worker = ScanWorker {
            pool,
            session_id,
            decoder,
            settings,
            clock,
            debouncer: Debouncer::new(settings.debounce_window),
            board,
            signals: signal_tx,
            report: ScanReport::default(),
        };

        let task = tokio::spawn(worker.run(device, cancel.clone()));

        Ok(ScanHandle {
            cancel,
            task: Some(task),
            signals: signal_rx,
            status: status_rx,
        })
    }
}

/// Control handle of a running pipeline. Dropping it requests stop.
pub struct ScanHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<ScanReport>>,
    signals: mpsc::UnboundedReceiver<ScanSignal>,
    status: watch::Receiver<StatusMessage>,
}

impl ScanHandle {
    /// Next signal, or `None` once the loop has ended.
    pub async fn next_signal(&mut self) -> Option<ScanSignal> {
        self.signals.recv().await
    }

    pub fn status(&self) -> watch::Receiver<StatusMessage> {
        self.status.clone()
    }

    /// Stop the loop, wait for it to release the device, and return its counters.
    pub async fn stop(mut self) -> AppResult<ScanReport> {
        self.cancel.cancel();
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| AppError::Other(format!("scan task failed: {e}"))),
            None => Ok(ScanReport::default()),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ScanWorker<D> {
    pool: SharedPool,
    session_id: i64,
    decoder: D,
    settings: ScanSettings,
    clock: Clock,
    debouncer: Debouncer,
    board: StatusBoard,
    signals: mpsc::UnboundedSender<ScanSignal>,
    report: ScanReport,
}

impl<D: Decoder> ScanWorker<D> {
    async fn run<C: CaptureDevice>(
        mut self,
        mut device: DeviceGuard<C>,
        cancel: CancellationToken,
    ) -> ScanReport {
        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                res = device.read_frame() => res,
            };

            match frame {
                Ok(frame) => {
                    self.report.frames += 1;
                    self.handle_frame(&frame);
                }
                Err(CaptureError::Closed) => {
                    info!(session_id = self.session_id, "capture feed exhausted");
                    break;
                }
                Err(e) => {
                    self.report.capture_errors += 1;
                    warn!(session_id = self.session_id, error = %e, "frame acquisition failed");
                    self.board
                        .post(StatusKind::Error, "Camera unavailable, retrying…");
                    self.emit(ScanSignal::CameraUnavailable(e.to_string()));
                }
            }
        }

        self.board.shutdown();
        drop(device);

        let r = self.report;
        audit(
            &self.pool.lock().conn,
            "scan_stop",
            &self.session_id.to_string(),
            &format!(
                "{} frames, {} marked, {} unknown, {} debounced",
                r.frames, r.marked, r.unknown, r.debounced
            ),
        );
        info!(session_id = self.session_id, report = ?r, "scan stopped");

        r
    }

    fn handle_frame(&mut self, frame: &capture::Frame) {
        let codes = match self.decoder.decode(frame) {
            Ok(codes) => codes,
            Err(e) => {
                debug!(error = %e, "frame skipped");
                return;
            }
        };

        for raw in codes {
            let code = raw.trim();
            if code.is_empty() {
                continue;
            }
            self.report.decoded += 1;
            self.process_code(code);
        }
    }

    fn process_code(&mut self, code: &str) {
        let now = Instant::now();
        if self.debouncer.is_quiet(code, now) {
            self.report.debounced += 1;
            trace!(code, "debounced");
            return;
        }

        let key = EntryKey::new(self.session_id, code);
        let outcome = mark_present(&self.pool.lock(), &key, (self.clock)());

        match outcome {
            Ok((name, entry)) => {
                self.debouncer.record(code, now);
                self.report.marked += 1;
                info!(session_id = self.session_id, person_id = code, "marked present");
                self.board.post(
                    StatusKind::Success,
                    format!("Scanned: {code} ({name}) marked as Present"),
                );
                self.emit(ScanSignal::MarkedPresent { name, entry });
            }
            Err(e) if e.is_not_found() => {
                self.report.unknown += 1;
                debug!(session_id = self.session_id, code, "unknown identifier");
                self.board
                    .post(StatusKind::Warning, format!("Unknown ID: {code}"));
                self.emit(ScanSignal::UnknownIdentifier(code.to_string()));
            }
            Err(e) => {
                warn!(session_id = self.session_id, code, error = %e, "scan not recorded");
                self.board.post(StatusKind::Error, format!("Error: {e}"));
            }
        }
    }

    fn emit(&self, signal: ScanSignal) {
        // nobody listening is fine
        let _ = self.signals.send(signal);
    }
}

/// Mark `key` present at `at` if the person has an entry in the session.
/// Returns the person's display name and the updated entry.
fn mark_present(pool: &DbPool, key: &EntryKey, at: NaiveDateTime) -> AppResult<(String, Entry)> {
    let view = load_entry_view(&pool.conn, key)?.ok_or_else(|| AppError::EntryNotFound {
        session_id: key.session_id,
        person_id: key.person_id.clone(),
    })?;

    let entry = AttendanceLogic::set_status_at(pool, key, AttendanceStatus::Present, at)?;
    Ok((view.person.name, entry))
}
