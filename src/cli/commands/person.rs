use crate::cli::commands::open_pool;
use crate::cli::parser::PersonAction;
use crate::config::Config;
use crate::core::badges::BadgeLogic;
use crate::core::filter::filter_persons;
use crate::core::roster::RosterLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;
use std::path::Path;

pub fn handle(action: &PersonAction, cfg: &Config) -> AppResult<()> {
    match action {
        PersonAction::Add {
            id,
            name,
            cohort,
            group,
        } => {
            let pool = open_pool(cfg)?;
            if RosterLogic::add_person(&pool, id, name, cohort, group)? {
                success(format!("Added {} ({})", name.trim(), id.trim()));
            } else {
                warning(format!("Person {} already exists, left unchanged", id.trim()));
            }
        }

        PersonAction::List { search } => {
            let pool = open_pool(cfg)?;
            let people = RosterLogic::get_all(&pool)?;

            let mut table = Table::new(["ID", "Name", "Cohort", "Group"]);
            for p in filter_persons(&people, search) {
                table.add_row(vec![
                    p.id.clone(),
                    p.name.clone(),
                    p.cohort.clone(),
                    p.group.clone(),
                ]);
            }

            if table.is_empty() {
                info("No people found.");
            } else {
                print!("{}", table.render());
            }
        }

        PersonAction::Show { id } => {
            let pool = open_pool(cfg)?;
            let p = RosterLogic::get_by_id(&pool, id)?;
            println!("ID:     {}", p.id);
            println!("Name:   {}", p.name);
            println!("Cohort: {}", colorize_optional(&p.cohort));
            println!("Group:  {}", colorize_optional(&p.group));
        }

        PersonAction::Import { file } => {
            let mut pool = open_pool(cfg)?;
            let summary = RosterLogic::import_csv(&mut pool, Path::new(file))?;
            success(format!(
                "Imported {} people ({} already present, {} rows skipped)",
                summary.inserted, summary.ignored, summary.skipped
            ));
        }

        PersonAction::Del { id } => {
            let pool = open_pool(cfg)?;
            RosterLogic::remove_person(&pool, id)?;
            success(format!("Removed {id} and their attendance entries"));
        }

        PersonAction::Qr { out } => {
            let pool = open_pool(cfg)?;
            let summary = BadgeLogic::generate(&pool, Path::new(out))?;
            if summary.written == 0 {
                warning("No people in the roster, no badges written.");
            } else {
                success(format!(
                    "{} QR badges saved in {} ({})",
                    summary.written,
                    out,
                    summary.cohorts.join(", ")
                ));
            }
        }
    }

    Ok(())
}
