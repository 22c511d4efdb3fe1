//! Connection bootstrap and lazy schema creation

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use rusqlite::Connection;

/// Resolves the default database location under the user's data directory.
pub fn default_db_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "libdesk")
        .ok_or_else(|| anyhow!("could not locate a home directory"))?;
    Ok(dirs.data_dir().join("libdesk.sqlite"))
}

/// Opens (creating if needed) the database at `path` and ensures the schema
/// exists. The parent directory is created on demand so a fresh machine can
/// run any command without a separate setup step.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory: {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database: {}", path.display()))?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// In-memory database for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Creates the three catalog tables when missing. `borrow` keys on the
/// `(cno, bno)` pair, which is what rejects a double borrow at the engine
/// level even if every application-side check were skipped.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS book (
            bno TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            press TEXT NOT NULL,
            year INTEGER NOT NULL,
            author TEXT NOT NULL,
            price REAL NOT NULL,
            total INTEGER NOT NULL,
            stock INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS card (
            cno TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            department TEXT NOT NULL,
            type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS borrow (
            cno TEXT NOT NULL,
            bno TEXT NOT NULL,
            borrow_date TEXT NOT NULL,
            return_date TEXT NOT NULL,
            PRIMARY KEY (cno, bno)
        );
        ",
    )
    .context("failed to create schema")?;

    Ok(())
}
