use crate::db::migrate::schema_version;
use crate::db::pool::DbPool;
use crate::db::queries::count_rows;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Row counts of the attendance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbCounts {
    pub persons: i64,
    pub events: i64,
    pub sessions: i64,
    pub entries: i64,
    pub present: i64,
}

pub fn collect_counts(pool: &DbPool) -> rusqlite::Result<DbCounts> {
    let present: i64 = pool.conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE status = 'Present'",
        [],
        |row| row.get(0),
    )?;

    Ok(DbCounts {
        persons: count_rows(&pool.conn, "persons")?,
        events: count_rows(&pool.conn, "events")?,
        sessions: count_rows(&pool.conn, "sessions")?,
        entries: count_rows(&pool.conn, "entries")?,
        present,
    })
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);
    println!(
        "{}• Schema version:{} {}",
        CYAN,
        RESET,
        schema_version(&pool.conn)?
    );

    //
    // 2) TOTALS
    //
    let counts = collect_counts(pool)?;
    println!("{}• People:{} {}{}{}", CYAN, RESET, GREEN, counts.persons, RESET);
    println!("{}• Events:{} {}{}{}", CYAN, RESET, GREEN, counts.events, RESET);
    println!("{}• Sessions:{} {}{}{}", CYAN, RESET, GREEN, counts.sessions, RESET);
    println!(
        "{}• Entries:{} {}{}{} ({} present)",
        CYAN, RESET, GREEN, counts.entries, RESET, counts.present
    );

    //
    // 3) EVENT DATE RANGE
    //
    let first_date: Option<String> = pool
        .conn
        .query_row("SELECT MIN(date) FROM events", [], |row| row.get(0))
        .optional()?
        .flatten();

    let last_date: Option<String> = pool
        .conn
        .query_row("SELECT MAX(date) FROM events", [], |row| row.get(0))
        .optional()?
        .flatten();

    let fmt_first = first_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last_date.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Event dates:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) ATTENDANCE RATE
    //
    if counts.entries > 0 {
        let rate = counts.present as f64 * 100.0 / counts.entries as f64;
        println!("{}• Overall attendance:{} {:.1}%", CYAN, RESET, rate);
    }

    println!();
    Ok(())
}
