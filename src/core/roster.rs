//! Roster store: the durable table of people attendance is taken for.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{delete_person, insert_person_ignore, load_person, load_persons};
use crate::errors::{AppError, AppResult};
use crate::models::person::Person;
use chrono::Local;
use std::path::Path;
use tracing::{debug, info};

/// Five people used by `init --sample`.
pub const SAMPLE_ROSTER: [(&str, &str, &str, &str); 5] = [
    ("2023-0001", "John Doe", "1st Year", "Computer Science"),
    ("2023-0002", "Jane Smith", "2nd Year", "Information Technology"),
    ("2023-0003", "Robert Johnson", "3rd Year", "Computer Engineering"),
    ("2023-0004", "Emily Davis", "4th Year", "Software Engineering"),
    ("2023-0005", "Michael Wilson", "1st Year", "Computer Science"),
];

/// Outcome of a bulk import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub ignored: usize,
    pub skipped: usize,
}

pub struct RosterLogic;

impl RosterLogic {
    /// Add a person. An existing `id` leaves the stored row untouched and is
    /// not an error. Returns `true` when a new row was created.
    pub fn add_person(
        pool: &DbPool,
        id: &str,
        name: &str,
        cohort: &str,
        group: &str,
    ) -> AppResult<bool> {
        let id = id.trim();
        let name = name.trim();

        if id.is_empty() {
            return Err(AppError::Validation("person id must not be empty".into()));
        }
        if name.is_empty() {
            return Err(AppError::Validation("person name must not be empty".into()));
        }

        let person = Person::new(id, name, cohort.trim(), group.trim());
        let inserted = insert_person_ignore(&pool.conn, &person, &Local::now().to_rfc3339())?;

        if inserted {
            info!(person_id = id, "person added");
            audit(&pool.conn, "person_add", id, &format!("Added {name}"));
        } else {
            debug!(person_id = id, "person already present, left unchanged");
        }

        Ok(inserted)
    }

    /// Every person, in storage order.
    pub fn get_all(pool: &DbPool) -> AppResult<Vec<Person>> {
        Ok(load_persons(&pool.conn)?)
    }

    pub fn get_by_id(pool: &DbPool, id: &str) -> AppResult<Person> {
        load_person(&pool.conn, id.trim())?.ok_or_else(|| AppError::PersonNotFound(id.to_string()))
    }

    /// Remove a person; their entries in every session go with them.
    pub fn remove_person(pool: &DbPool, id: &str) -> AppResult<()> {
        let id = id.trim();
        if delete_person(&pool.conn, id)? == 0 {
            return Err(AppError::PersonNotFound(id.to_string()));
        }

        info!(person_id = id, "person removed");
        audit(&pool.conn, "person_del", id, "Removed from roster");
        Ok(())
    }

    /// Bulk add from `(id, name, cohort, group)` tuples, ignoring duplicates.
    pub fn import<I>(pool: &mut DbPool, rows: I) -> AppResult<ImportSummary>
    where
        I: IntoIterator<Item = (String, String, String, String)>,
    {
        let mut summary = ImportSummary::default();
        let created_at = Local::now().to_rfc3339();

        let tx = pool.conn.transaction()?;
        for (id, name, cohort, group) in rows {
            let person = Person::new(id.trim(), name.trim(), cohort.trim(), group.trim());
            if person.id.is_empty() || person.name.is_empty() {
                summary.skipped += 1;
                continue;
            }

            if insert_person_ignore(&tx, &person, &created_at)? {
                summary.inserted += 1;
            } else {
                summary.ignored += 1;
            }
        }
        tx.commit()?;

        info!(
            inserted = summary.inserted,
            ignored = summary.ignored,
            skipped = summary.skipped,
            "roster import finished"
        );
        audit(
            &pool.conn,
            "person_import",
            "",
            &format!(
                "{} inserted, {} already present, {} skipped",
                summary.inserted, summary.ignored, summary.skipped
            ),
        );

        Ok(summary)
    }

    /// Import a CSV roster file with a header row and the columns
    /// `id, name, cohort, group`. Rows with fewer than four fields are skipped.
    pub fn import_csv(pool: &mut DbPool, path: &Path) -> AppResult<ImportSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut rows = Vec::new();
        let mut short_rows = 0;
        for record in reader.records() {
            let record = record?;
            if record.len() < 4 {
                short_rows += 1;
                continue;
            }
            rows.push((
                record[0].to_string(),
                record[1].to_string(),
                record[2].to_string(),
                record[3].to_string(),
            ));
        }

        let mut summary = Self::import(pool, rows)?;
        summary.skipped += short_rows;
        Ok(summary)
    }

    /// Seed the roster with `SAMPLE_ROSTER`.
    pub fn import_sample(pool: &mut DbPool) -> AppResult<ImportSummary> {
        Self::import(
            pool,
            SAMPLE_ROSTER.iter().map(|(id, name, cohort, group)| {
                (
                    id.to_string(),
                    name.to_string(),
                    cohort.to_string(),
                    group.to_string(),
                )
            }),
        )
    }
}
