mod common;
use common::{init_db_with_session, rti, setup_test_db, temp_out};
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;

#[test]
fn test_init_with_sample_roster() {
    let db_path = setup_test_db("cli_init_sample");

    rti()
        .args(["--db", &db_path, "--test", "init", "--sample"])
        .assert()
        .success()
        .stdout(contains("Sample roster loaded: 5 added"));

    rti()
        .args(["--db", &db_path, "person", "list"])
        .assert()
        .success()
        .stdout(contains("John Doe").and(contains("Michael Wilson")));
}

#[test]
fn test_person_search_and_show() {
    let db_path = setup_test_db("cli_person_search");
    rti()
        .args(["--db", &db_path, "--test", "init", "--sample"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "person", "list", "--search", "SMITH"])
        .assert()
        .success()
        .stdout(contains("Jane Smith").and(contains("John Doe").not()));

    rti()
        .args(["--db", &db_path, "person", "show", "2023-0003"])
        .assert()
        .success()
        .stdout(contains("Robert Johnson"));

    rti()
        .args(["--db", &db_path, "person", "show", "nobody"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn test_person_qr_writes_badges_per_cohort() {
    let db_path = setup_test_db("cli_person_qr");
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("badges");
    let out_str = out_dir.to_string_lossy().to_string();

    rti()
        .args(["--db", &db_path, "person", "qr", "--out", &out_str])
        .assert()
        .success()
        .stdout(contains("No people in the roster"));
    assert!(!out_dir.exists());

    rti()
        .args(["--db", &db_path, "--test", "init", "--sample"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "person", "qr", "--out", &out_str])
        .assert()
        .success()
        .stdout(contains("5 QR badges saved"));

    let cohorts = fs::read_dir(&out_dir).unwrap().count();
    assert_eq!(cohorts, 4);
    assert_eq!(fs::read_dir(out_dir.join("1st Year")).unwrap().count(), 2);
    assert!(out_dir.join("3rd Year").join("2023-0003.png").is_file());

    rti()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("person_qr"));
}

#[test]
fn test_session_snapshot_and_listing() {
    let db_path = setup_test_db("cli_session_snapshot");
    rti()
        .args(["--db", &db_path, "--test", "init", "--sample"])
        .assert()
        .success();
    rti()
        .args(["--db", &db_path, "event", "create", "Seminar"])
        .assert()
        .success()
        .stdout(contains("Event 1 created: Seminar"));

    rti()
        .args(["--db", &db_path, "session", "create", "--event", "1", "Morning"])
        .assert()
        .success()
        .stdout(contains("5 people marked Absent"));

    rti()
        .args(["--db", &db_path, "session", "list", "--event", "1"])
        .assert()
        .success()
        .stdout(contains("Morning"));

    rti()
        .args(["--db", &db_path, "session", "create", "--event", "9", "Ghost"])
        .assert()
        .failure()
        .stderr(contains("Event 9 not found"));
}

#[test]
fn test_mark_then_filter_entries() {
    let db_path = setup_test_db("cli_mark_filter");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "mark", "--session", "1", "2023-0001", "present"])
        .assert()
        .success()
        .stdout(contains("Present"));

    rti()
        .args(["--db", &db_path, "mark", "--session", "1", "2023-0002", "e"])
        .assert()
        .success()
        .stdout(contains("Excused"));

    rti()
        .args(["--db", &db_path, "entries", "--session", "1", "--status", "present"])
        .assert()
        .success()
        .stdout(contains("John Doe").and(contains("Jane Smith").not()));

    rti()
        .args(["--db", &db_path, "entries", "--event", "1", "--search", "computer"])
        .assert()
        .success()
        .stdout(
            contains("John Doe")
                .and(contains("Robert Johnson"))
                .and(contains("Jane Smith").not()),
        );
}

#[test]
fn test_mark_rejects_bad_input() {
    let db_path = setup_test_db("cli_mark_bad");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "mark", "--session", "1", "2023-0001", "late"])
        .assert()
        .failure()
        .stderr(contains("Invalid attendance status"));

    rti()
        .args(["--db", &db_path, "mark", "--session", "1", "9999", "present"])
        .assert()
        .failure()
        .stderr(contains("No attendance entry"));
}

#[test]
fn test_entries_needs_a_context() {
    let db_path = setup_test_db("cli_entries_ctx");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "entries"])
        .assert()
        .failure();
}

#[test]
fn test_scan_from_feed_file() {
    let db_path = setup_test_db("cli_scan_feed");
    init_db_with_session(&db_path);

    let feed = temp_out("cli_scan_feed", "txt");
    fs::write(&feed, "2023-0002\nNOT-A-STUDENT\n2023-0002\n2023-0004;2023-0005\n").unwrap();

    rti()
        .args([
            "--db",
            &db_path,
            "scan",
            "--session",
            "1",
            "--feed",
            &feed,
            "--interval-ms",
            "1",
        ])
        .assert()
        .success()
        .stdout(contains(
            "Scan finished: 3 marked present, 1 unknown, 1 repeated scans ignored",
        ));

    rti()
        .args(["--db", &db_path, "entries", "--session", "1", "--status", "present"])
        .assert()
        .success()
        .stdout(
            contains("Jane Smith")
                .and(contains("Emily Davis"))
                .and(contains("Michael Wilson"))
                .and(contains("John Doe").not()),
        );
}

#[test]
fn test_scan_with_missing_feed_fails_to_start() {
    let db_path = setup_test_db("cli_scan_missing_feed");
    init_db_with_session(&db_path);

    rti()
        .args([
            "--db",
            &db_path,
            "scan",
            "--session",
            "1",
            "--feed",
            "/definitely/not/here.txt",
        ])
        .assert()
        .failure()
        .stderr(contains("Could not open capture device"));
}

#[test]
fn test_export_csv_and_json() {
    let db_path = setup_test_db("cli_export");
    init_db_with_session(&db_path);
    rti()
        .args(["--db", &db_path, "mark", "--session", "1", "2023-0003", "present"])
        .assert()
        .success();

    let csv_out = temp_out("cli_export", "csv");
    rti()
        .args([
            "--db", &db_path, "export", "--session", "1", "--format", "csv", "--file", &csv_out,
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&csv_out).expect("read exported csv");
    assert!(content.starts_with("ID,Name,Cohort,Group,Session,Status,Timestamp"));
    assert!(content.contains("2023-0003,Robert Johnson,3rd Year,Computer Engineering,Morning,Present,"));
    assert_eq!(content.lines().count(), 6);

    let json_out = temp_out("cli_export", "json");
    rti()
        .args([
            "--db", &db_path, "export", "--event", "1", "--format", "json", "--file", &json_out,
            "--status", "present",
        ])
        .assert()
        .success();

    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
    assert_eq!(v["total"], 1);
    assert_eq!(v["rows"][0]["name"], "Robert Johnson");
}

#[test]
fn test_export_overwrite_needs_force() {
    let db_path = setup_test_db("cli_export_force");
    init_db_with_session(&db_path);

    let out = temp_out("cli_export_force", "xlsx");
    fs::write(&out, "old").unwrap();

    rti()
        .args([
            "--db", &db_path, "export", "--session", "1", "--format", "xlsx", "--file", &out,
        ])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(contains("export cancelled"));

    rti()
        .args([
            "--db", &db_path, "export", "--session", "1", "--format", "xlsx", "--file", &out,
            "--force",
        ])
        .assert()
        .success();

    assert!(fs::read(&out).unwrap().starts_with(b"PK"));
}

#[test]
fn test_export_relative_path_is_rejected() {
    let db_path = setup_test_db("cli_export_relative");
    init_db_with_session(&db_path);

    rti()
        .args([
            "--db", &db_path, "export", "--session", "1", "--format", "csv", "--file",
            "relative.csv",
        ])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_person_delete_removes_entries() {
    let db_path = setup_test_db("cli_person_del");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "person", "del", "2023-0001"])
        .assert()
        .success();

    rti()
        .args(["--db", &db_path, "entries", "--session", "1"])
        .assert()
        .success()
        .stdout(contains("4 shown").and(contains("John Doe").not()));
}

#[test]
fn test_log_records_operations() {
    let db_path = setup_test_db("cli_log");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("session_create").and(contains("event_create")));
}

#[test]
fn test_db_info_and_check() {
    let db_path = setup_test_db("cli_db_info");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_db_maintenance_steps() {
    let db_path = setup_test_db("cli_db_maintenance");
    init_db_with_session(&db_path);

    rti()
        .args(["--db", &db_path, "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Schema version 1 is up to date"));

    rti()
        .args(["--db", &db_path, "db", "--vacuum"])
        .assert()
        .success()
        .stdout(contains("Vacuum completed").and(contains("People:").not()));

    rti()
        .args(["--db", &db_path, "db"])
        .assert()
        .success()
        .stdout(contains("Schema version:").and(contains("People:")));
}

#[cfg(unix)]
#[test]
fn test_scan_from_open_stdin_stops_on_interrupt() {
    use std::io::{BufRead, BufReader};
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    let db_path = setup_test_db("cli_scan_stdin_interrupt");
    init_db_with_session(&db_path);

    let mut child = Command::new(env!("CARGO_BIN_EXE_rollcall"))
        .args(["--db", &db_path, "scan", "--session", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn scan");

    // keep the writer end open for the whole test
    let _stdin = child.stdin.take().expect("stdin");

    let mut stdout = BufReader::new(child.stdout.take().expect("stdout"));
    let mut first = String::new();
    stdout.read_line(&mut first).expect("read ready line");
    assert!(first.contains("Point camera at QR code"), "{first}");
    thread::sleep(Duration::from_millis(300));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("send SIGINT");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let exit = loop {
        if let Some(exit) = child.try_wait().expect("poll child") {
            break Some(exit);
        }
        if Instant::now() >= deadline {
            break None;
        }
        thread::sleep(Duration::from_millis(50));
    };

    if exit.is_none() {
        child.kill().ok();
        panic!("scan still running 5s after interrupt");
    }
    assert!(exit.is_some_and(|e| e.success()));

    let mut rest = String::new();
    for line in stdout.lines() {
        rest.push_str(&line.expect("stdout line"));
    }
    assert!(rest.contains("Scan finished: 0 marked present"));
}
