use crate::cli::commands::open_pool;
use crate::cli::parser::SessionAction;
use crate::config::Config;
use crate::core::lifecycle::LifecycleLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(action: &SessionAction, cfg: &Config) -> AppResult<()> {
    match action {
        SessionAction::Create { event, name } => {
            let mut pool = open_pool(cfg)?;
            let session = LifecycleLogic::create_session(&mut pool, *event, name)?;
            let entries = LifecycleLogic::list_entries_for_session(&pool, session.id)?;
            success(format!(
                "Session {} created: {} ({} people marked Absent)",
                session.id,
                session.name,
                entries.len()
            ));
        }
        SessionAction::List { event } => {
            let pool = open_pool(cfg)?;
            let sessions = LifecycleLogic::list_sessions_for_event(&pool, *event)?;
            if sessions.is_empty() {
                info("No sessions for this event.");
                return Ok(());
            }

            let mut table = Table::new(["ID", "Name", "Created"]);
            for s in &sessions {
                table.add_row(vec![
                    s.id.to_string(),
                    s.name.clone(),
                    s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
