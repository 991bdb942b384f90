//! SQLite connection wrapper (lightweight for CLI usage).

use parking_lot::Mutex;
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::Arc;

pub struct DbPool {
    pub conn: Connection,
}

/// Connection shared between the operator path and the scan task.
/// The mutex serializes every write to the entry table.
pub type SharedPool = Arc<Mutex<DbPool>>;

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(conn)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        // cascades on sessions/entries depend on this
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn into_shared(self) -> SharedPool {
        Arc::new(Mutex::new(self))
    }
}
