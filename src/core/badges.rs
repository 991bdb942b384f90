//! Printable QR badges for the roster: one PNG per person, grouped in one
//! directory per cohort. Each code carries the bare person id, which is what
//! the scan pipeline looks up.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::load_persons;
use crate::errors::{AppError, AppResult};
use crate::models::person::Person;
use image::Luma;
use qrcode::QrCode;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Directory used for people with a blank cohort.
pub const UNASSIGNED_COHORT: &str = "unassigned";

const BADGE_MIN_SIZE: u32 = 240;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BadgeSummary {
    pub written: usize,
    /// Cohort directories created, sorted.
    pub cohorts: Vec<String>,
}

pub struct BadgeLogic;

/// Make `raw` safe as a single path component.
fn path_component(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        fallback.to_string()
    } else {
        cleaned
    }
}

impl BadgeLogic {
    /// Render the QR code of `id` as a PNG at `path`.
    pub fn render_badge(id: &str, path: &Path) -> AppResult<()> {
        let code = QrCode::new(id.as_bytes())
            .map_err(|e| AppError::Badge(format!("{id}: {e}")))?;

        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(BADGE_MIN_SIZE, BADGE_MIN_SIZE)
            .build();

        image
            .save(path)
            .map_err(|e| AppError::Badge(format!("{}: {e}", path.display())))
    }

    /// Write `<out_dir>/<cohort>/<id>.png` for every roster member.
    /// An empty roster writes nothing and creates no directories.
    pub fn generate(pool: &DbPool, out_dir: &Path) -> AppResult<BadgeSummary> {
        let people = load_persons(&pool.conn)?;

        let mut by_cohort: BTreeMap<String, Vec<&Person>> = BTreeMap::new();
        for p in &people {
            by_cohort
                .entry(path_component(&p.cohort, UNASSIGNED_COHORT))
                .or_default()
                .push(p);
        }

        let mut summary = BadgeSummary::default();
        for (cohort, members) in &by_cohort {
            let dir = out_dir.join(cohort);
            fs::create_dir_all(&dir)?;

            for p in members {
                let file = dir.join(format!("{}.png", path_component(&p.id, "_")));
                Self::render_badge(&p.id, &file)?;
                summary.written += 1;
            }
            summary.cohorts.push(cohort.clone());
        }

        if summary.written > 0 {
            info!(
                written = summary.written,
                cohorts = summary.cohorts.len(),
                out = %out_dir.display(),
                "badges generated"
            );
            audit(
                &pool.conn,
                "person_qr",
                &out_dir.display().to_string(),
                &format!(
                    "{} badges in {} cohorts",
                    summary.written,
                    summary.cohorts.len()
                ),
            );
        }

        Ok(summary)
    }
}
