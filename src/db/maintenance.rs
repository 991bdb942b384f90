//! Housekeeping behind `rollcall db`: schema upgrades, health checks and
//! compaction. Nothing here prints; the command layer renders the reports.

use crate::db::log::audit;
use crate::db::migrate::{SCHEMA_VERSION, run_pending_migrations, schema_version};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from: i32,
    pub to: i32,
}

impl MigrationOutcome {
    pub fn upgraded(&self) -> bool {
        self.to > self.from
    }
}

/// A row that points at a parent that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRow {
    pub table: String,
    pub rowid: Option<i64>,
    pub parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub schema_version: i32,
    /// `integrity_check` messages other than "ok".
    pub problems: Vec<String>,
    pub dangling: Vec<DanglingRow>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.problems.is_empty() && self.dangling.is_empty() && self.schema_version >= SCHEMA_VERSION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacuumOutcome {
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl VacuumOutcome {
    pub fn reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

pub fn migrate(conn: &Connection) -> AppResult<MigrationOutcome> {
    let from = schema_version(conn)?;
    run_pending_migrations(conn)?;
    let to = schema_version(conn)?;

    if to > from {
        audit(conn, "db_migrate", "", &format!("schema {from} -> {to}"));
    }
    Ok(MigrationOutcome { from, to })
}

pub fn check(conn: &Connection) -> AppResult<HealthReport> {
    let mut stmt = conn.prepare("PRAGMA integrity_check;")?;
    let problems = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .filter(|msg| msg != "ok")
        .collect::<Vec<_>>();

    let mut stmt = conn.prepare("PRAGMA foreign_key_check;")?;
    let dangling = stmt
        .query_map([], |row| {
            Ok(DanglingRow {
                table: row.get(0)?,
                rowid: row.get(1)?,
                parent: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let report = HealthReport {
        schema_version: schema_version(conn)?,
        problems,
        dangling,
    };

    if report.is_healthy() {
        info!(version = report.schema_version, "database check passed");
    } else {
        warn!(
            version = report.schema_version,
            problems = report.problems.len(),
            dangling = report.dangling.len(),
            "database check failed"
        );
    }
    Ok(report)
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// VACUUM the database at `path` and report its size on disk around it.
pub fn vacuum(pool: &DbPool, path: &Path) -> AppResult<VacuumOutcome> {
    let bytes_before = file_size(path);
    pool.conn.execute_batch("VACUUM;")?;
    let outcome = VacuumOutcome {
        bytes_before,
        bytes_after: file_size(path),
    };

    info!(
        before = outcome.bytes_before,
        after = outcome.bytes_after,
        "database vacuumed"
    );
    Ok(outcome)
}
