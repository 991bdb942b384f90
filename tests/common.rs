#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rollcall::core::lifecycle::LifecycleLogic;
use rollcall::core::roster::RosterLogic;
use rollcall::db::initialize::init_db;
use rollcall::db::pool::DbPool;
use rollcall::models::session::Session;
use rollcall::scan::{CaptureDevice, CaptureError, Frame};
use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn rti() -> Command {
    cargo_bin_cmd!("rollcall")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rollcall.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB with the sample roster, one event and one session.
/// The session has id 1 and holds the five sample people.
pub fn init_db_with_session(db_path: &str) {
    rti()
        .args(["--db", db_path, "--test", "init", "--sample"])
        .assert()
        .success();

    rti()
        .args(["--db", db_path, "event", "create", "Seminar"])
        .assert()
        .success();

    rti()
        .args(["--db", db_path, "session", "create", "--event", "1", "Morning"])
        .assert()
        .success();
}

/// In-memory database with the schema applied.
pub fn open_pool() -> DbPool {
    let pool = DbPool::in_memory().expect("open in-memory db");
    init_db(&pool.conn).expect("init db");
    pool
}

pub fn add_people(pool: &DbPool, people: &[(&str, &str)]) {
    for (id, name) in people {
        RosterLogic::add_person(pool, id, name, "", "").expect("add person");
    }
}

/// Roster `P1..P3`, one event and one session snapshotting them.
pub fn pool_with_session() -> (DbPool, Session) {
    let mut pool = open_pool();
    add_people(&pool, &[("P1", "Ann"), ("P2", "Ben"), ("P3", "Cleo")]);
    let ev = LifecycleLogic::create_event(&pool, "Seminar").expect("create event");
    let session = LifecycleLogic::create_session(&mut pool, ev.id, "Morning").expect("create session");
    (pool, session)
}

/// Capture device fed from a fixed script of frames.
pub struct ScriptedCapture {
    frames: VecDeque<Result<Frame, CaptureError>>,
    fail_open: bool,
    hold_open: bool,
    released: Arc<AtomicBool>,
}

impl ScriptedCapture {
    /// Text frames; the device reports `Closed` once they run out.
    pub fn lines(lines: &[&str]) -> Self {
        Self::script(lines.iter().map(|l| Ok(Frame::new(l.as_bytes()))).collect())
    }

    pub fn script(frames: Vec<Result<Frame, CaptureError>>) -> Self {
        Self {
            frames: frames.into(),
            fail_open: false,
            hold_open: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::script(Vec::new())
        }
    }

    /// Block forever instead of closing when the script runs out.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl CaptureDevice for ScriptedCapture {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.fail_open {
            Err(CaptureError::Open("no camera attached".into()))
        } else {
            Ok(())
        }
    }

    async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        match self.frames.pop_front() {
            Some(frame) => frame,
            None if self.hold_open => std::future::pending().await,
            None => Err(CaptureError::Closed),
        }
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
