//! Database connection manager for the single-file SQLite store.

use std::path::{Path, PathBuf};

use idletally_domain::Result;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection};
use tracing::info;

use crate::errors::map_sql_error;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Owns the one connection the repository writes through.
pub struct DbManager {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl DbManager {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(map_sql_error)?;
        let manager = Self::from_connection(conn, Some(path))?;
        info!(db_path = ?manager.path, "sqlite database opened");
        Ok(manager)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_sql_error)?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON").map_err(map_sql_error)?;
        let manager = Self { conn: Mutex::new(conn), path };
        manager.run_migrations()?;
        Ok(manager)
    }

    /// Lock the connection for the duration of one repository call.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.connection();
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
            params![SCHEMA_VERSION],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    /// Database file path, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Verify the database is accessible and responding.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.connection();
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(map_sql_error)?;
        Ok(())
    }
}
