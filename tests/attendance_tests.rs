mod common;
use chrono::NaiveDate;
use common::pool_with_session;
use rollcall::core::attendance::AttendanceLogic;
use rollcall::core::lifecycle::LifecycleLogic;
use rollcall::db::queries::load_entry;
use rollcall::errors::AppError;
use rollcall::models::entry::EntryKey;
use rollcall::models::status::AttendanceStatus;

fn at(h: u32, m: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[test]
fn test_set_status_stamps_entry() {
    let (pool, session) = pool_with_session();
    let key = EntryKey::new(session.id, "P1");

    let entry =
        AttendanceLogic::set_status_at(&pool, &key, AttendanceStatus::Present, at(9, 0, 0)).unwrap();

    assert_eq!(entry.status, AttendanceStatus::Present);
    assert_eq!(entry.timestamp, Some(at(9, 0, 0)));
    assert_eq!(load_entry(&pool.conn, &key).unwrap(), Some(entry));
}

#[test]
fn test_same_status_again_refreshes_timestamp() {
    let (pool, session) = pool_with_session();
    let key = EntryKey::new(session.id, "P1");

    AttendanceLogic::set_status_at(&pool, &key, AttendanceStatus::Present, at(9, 0, 0)).unwrap();
    let again =
        AttendanceLogic::set_status_at(&pool, &key, AttendanceStatus::Present, at(9, 5, 0)).unwrap();

    assert_eq!(again.status, AttendanceStatus::Present);
    assert_eq!(again.timestamp, Some(at(9, 5, 0)));
}

#[test]
fn test_every_transition_is_allowed() {
    let (pool, session) = pool_with_session();
    let key = EntryKey::new(session.id, "P2");

    let mut minute = 0;
    for from in AttendanceStatus::ALL {
        for to in AttendanceStatus::ALL {
            AttendanceLogic::set_status_at(&pool, &key, from, at(10, minute, 0)).unwrap();
            let e = AttendanceLogic::set_status_at(&pool, &key, to, at(10, minute, 30)).unwrap();
            assert_eq!(e.status, to, "{from} -> {to}");
            minute += 1;
        }
    }
}

#[test]
fn test_unknown_entry_is_not_found_and_nothing_changes() {
    let (pool, session) = pool_with_session();
    let before = LifecycleLogic::list_entries_for_session(&pool, session.id).unwrap();

    let err = AttendanceLogic::set_status(
        &pool,
        &EntryKey::new(session.id, "NOPE"),
        AttendanceStatus::Present,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::EntryNotFound { ref person_id, .. } if person_id == "NOPE"));

    let err = AttendanceLogic::set_status(
        &pool,
        &EntryKey::new(session.id + 100, "P1"),
        AttendanceStatus::Excused,
    )
    .unwrap_err();
    assert!(err.is_not_found());

    let after = LifecycleLogic::list_entries_for_session(&pool, session.id).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_status_codes_parse() {
    assert_eq!(AttendanceStatus::from_code("Present"), Some(AttendanceStatus::Present));
    assert_eq!(AttendanceStatus::from_code("a"), Some(AttendanceStatus::Absent));
    assert_eq!(AttendanceStatus::from_code(" EXCUSED "), Some(AttendanceStatus::Excused));
    assert_eq!(AttendanceStatus::from_code("late"), None);
}
