use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::roster::RosterLogic;
use crate::db::initialize::init_db;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database and all pending migrations
///  - optionally, the sample roster
pub fn handle(cli: &Cli) -> AppResult<()> {
    let sample = matches!(cli.command, Commands::Init { sample: true });

    let db_path = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    println!("⚙️  Initializing rollcall…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &db_path);

    let mut pool = DbPool::new(&db_path)?;
    init_db(&pool.conn)?;

    println!("✅ Database initialized at {}", &db_path);

    if sample {
        let summary = RosterLogic::import_sample(&mut pool)?;
        success(format!(
            "Sample roster loaded: {} added, {} already present",
            summary.inserted, summary.ignored
        ));
    }

    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &db_path),
    ) {
        eprintln!("⚠️ Failed to write internal log: {}", e);
    }

    println!("🎉 rollcall initialization completed!");
    Ok(())
}
