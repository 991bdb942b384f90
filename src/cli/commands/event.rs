use crate::cli::commands::open_pool;
use crate::cli::parser::EventAction;
use crate::config::Config;
use crate::core::lifecycle::LifecycleLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(action: &EventAction, cfg: &Config) -> AppResult<()> {
    let pool = open_pool(cfg)?;

    match action {
        EventAction::Create { name } => {
            let ev = LifecycleLogic::create_event(&pool, name)?;
            success(format!("Event {} created: {} ({})", ev.id, ev.name, ev.date_str()));
        }
        EventAction::List => {
            let events = LifecycleLogic::list_events(&pool)?;
            if events.is_empty() {
                info("No events yet.");
                return Ok(());
            }

            let mut table = Table::new(["ID", "Name", "Date"]);
            for ev in &events {
                table.add_row(vec![ev.id.to_string(), ev.name.clone(), ev.date_str()]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
