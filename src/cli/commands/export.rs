use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::export::{ExportLogic, default_file_name};
use crate::models::context::ViewContext;
use crate::models::status::StatusFilter;
use chrono::Local;
use std::env;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        context,
        format,
        file,
        filter,
        force,
    } = cmd
    {
        let status = StatusFilter::from_code(&filter.status)
            .ok_or_else(|| AppError::InvalidStatus(filter.status.clone()))?;

        let pool = open_pool(cfg)?;
        let ctx = ViewContext::resolve(&pool, context.event, context.session)?;

        let file = match file {
            Some(f) => f.clone(),
            None => {
                let label = ctx.label(&pool)?;
                let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
                env::current_dir()?
                    .join(default_file_name(&label, &stamp, format.as_str()))
                    .to_string_lossy()
                    .to_string()
            }
        };

        ExportLogic::export(
            &pool,
            &ctx,
            *format,
            &file,
            &filter.search,
            status,
            *force,
        )?;
    }
    Ok(())
}
