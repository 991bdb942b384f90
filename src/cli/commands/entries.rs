use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::filter::filter_entries;
use crate::errors::{AppError, AppResult};
use crate::models::context::ViewContext;
use crate::models::status::{AttendanceStatus, StatusFilter};
use crate::ui::messages::{header, info};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Entries { context, filter } = cmd {
        let status = StatusFilter::from_code(&filter.status)
            .ok_or_else(|| AppError::InvalidStatus(filter.status.clone()))?;

        let pool = open_pool(cfg)?;
        let ctx = ViewContext::resolve(&pool, context.event, context.session)?;
        let entries = ctx.load_entries(&pool)?;
        let with_session = matches!(ctx, ViewContext::Event { .. });

        header(ctx.label(&pool)?);

        let mut headers = vec!["ID", "Name", "Cohort", "Group"];
        if with_session {
            headers.push("Session");
        }
        headers.extend(["Status", "Timestamp"]);

        let mut table = Table::new(headers);
        let mut present = 0usize;
        let mut shown = 0usize;

        for v in filter_entries(&entries, &filter.search, status) {
            let mut row = vec![
                v.person.id.clone(),
                v.person.name.clone(),
                v.person.cohort.clone(),
                v.person.group.clone(),
            ];
            if with_session {
                row.push(v.session_name.clone());
            }
            row.push(v.entry.status.to_string());
            row.push(v.entry.timestamp_str());
            table.add_row(row);

            shown += 1;
            if v.entry.status == AttendanceStatus::Present {
                present += 1;
            }
        }

        if table.is_empty() {
            info("No entries match.");
            return Ok(());
        }

        print!("{}", table.render());
        println!("\n{shown} shown, {present} present ({} total)", entries.len());
    }

    Ok(())
}
