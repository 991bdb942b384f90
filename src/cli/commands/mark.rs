use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::errors::{AppError, AppResult};
use crate::models::entry::EntryKey;
use crate::models::status::AttendanceStatus;
use crate::utils::colors::{RESET, color_for_status};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Mark {
        session,
        person,
        status,
    } = cmd
    {
        let status = AttendanceStatus::from_code(status)
            .ok_or_else(|| AppError::InvalidStatus(status.clone()))?;

        let pool = open_pool(cfg)?;
        let key = EntryKey::new(*session, person.trim());
        let entry = AttendanceLogic::set_status(&pool, &key, status)?;

        println!(
            "✅ {} in session {} is now {}{}{} ({})",
            entry.person_id,
            entry.session_id,
            color_for_status(entry.status),
            entry.status,
            RESET,
            entry.timestamp_str()
        );
    }

    Ok(())
}
