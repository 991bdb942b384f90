pub mod config;
pub mod db;
pub mod entries;
pub mod event;
pub mod export;
pub mod init;
pub mod log;
pub mod mark;
pub mod person;
pub mod scan;
pub mod session;

use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Open the configured database with its schema brought up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}
