use std::env;
use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;
use tracing::debug;

use crate::error::FitplanError;

use super::migrations;

pub const WORKSPACE_DIR: &str = ".fitplan";
pub const DIR_ENV: &str = "FITPLAN_DIR";

/// Locate the workspace data directory: `$FITPLAN_DIR`, else the nearest
/// ancestor of the current directory holding a `.fitplan/` directory.
pub fn find_workspace() -> Result<Option<PathBuf>, FitplanError> {
    if let Some(dir) = env::var_os(DIR_ENV) {
        return Ok(Some(PathBuf::from(dir)));
    }
    let mut dir = env::current_dir().map_err(|e| FitplanError::database(e.to_string()))?;
    loop {
        let candidate = dir.join(WORKSPACE_DIR);
        if candidate.is_dir() {
            return Ok(Some(candidate));
        }
        if !dir.pop() {
            return Ok(None);
        }
    }
}

/// Directory `init` writes to: the existing workspace, or `./.fitplan`.
pub fn workspace_dir() -> Result<PathBuf, FitplanError> {
    match find_workspace()? {
        Some(dir) => Ok(dir),
        None => {
            let cwd = env::current_dir().map_err(|e| FitplanError::database(e.to_string()))?;
            Ok(cwd.join(WORKSPACE_DIR))
        }
    }
}

/// Get the path to the fitplan database.
pub fn db_path() -> Result<PathBuf, FitplanError> {
    Ok(workspace_dir()?.join("fitplan.db"))
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf, FitplanError> {
    Ok(workspace_dir()?.join("config.json"))
}

/// Open a connection to the database. Returns error if not initialized.
pub fn open_db() -> Result<Connection, FitplanError> {
    let path = db_path()?;
    if !path.exists() {
        return Err(FitplanError::not_initialized());
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    debug!(path = %path.display(), "opened database");
    Ok(conn)
}

/// Initialize the database: create directories, database, and run migrations.
pub fn init_db() -> Result<PathBuf, FitplanError> {
    let path = db_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FitplanError::database(e.to_string()))?;
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(path)
}

/// In-memory database with the full schema, for library callers and tests.
pub fn open_in_memory() -> Result<Connection, FitplanError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), FitplanError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run `f` inside `BEGIN IMMEDIATE`, committing on success and rolling back on error.
pub fn with_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, FitplanError>,
) -> Result<T, FitplanError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
