use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::maintenance::{self, HealthReport};
use crate::db::migrate::SCHEMA_VERSION;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, info, success, warning};
use std::path::Path;

fn human_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{:.2} MB", b as f64 / (1024.0 * 1024.0)),
        b if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{b} B"),
    }
}

fn render_health(report: &HealthReport) {
    if report.schema_version < SCHEMA_VERSION {
        warning(format!(
            "Schema version {} is behind {}; run `rollcall db --migrate`.",
            report.schema_version, SCHEMA_VERSION
        ));
    }
    for msg in &report.problems {
        error(format!("integrity: {msg}"));
    }
    for row in &report.dangling {
        let rowid = row.rowid.map(|r| format!(" row {r}")).unwrap_or_default();
        error(format!(
            "{}{} references a missing {} row",
            row.table, rowid, row.parent
        ));
    }
    if report.is_healthy() {
        success(format!(
            "Integrity check passed (schema version {}, no dangling references).",
            report.schema_version
        ));
    }
}

/// `rollcall db`: with no flag, show the summary; otherwise run the requested
/// steps in migrate, check, vacuum, info order.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    let pool = DbPool::new(&cfg.database)?;
    let db_path = Path::new(&cfg.database);

    if *migrate {
        let outcome = maintenance::migrate(&pool.conn)?;
        if outcome.upgraded() {
            success(format!(
                "Schema upgraded from version {} to {}.",
                outcome.from, outcome.to
            ));
        } else {
            info(format!("Schema version {} is up to date.", outcome.to));
        }
    }

    let mut failed_check = None;
    if *check {
        let report = maintenance::check(&pool.conn)?;
        render_health(&report);
        if !report.is_healthy() {
            failed_check = Some(format!(
                "{} integrity problems, {} dangling references",
                report.problems.len(),
                report.dangling.len()
            ));
        }
    }

    if *vacuum {
        let outcome = maintenance::vacuum(&pool, db_path)?;
        success(format!(
            "Vacuum completed: {} -> {} ({} reclaimed).",
            human_size(outcome.bytes_before),
            human_size(outcome.bytes_after),
            human_size(outcome.reclaimed())
        ));
    }

    if *show_info || !(*migrate || *check || *vacuum) {
        stats::print_db_info(&pool, &cfg.database)?;
    }

    match failed_check {
        Some(summary) => Err(AppError::DbCheck(summary)),
        None => Ok(()),
    }
}
