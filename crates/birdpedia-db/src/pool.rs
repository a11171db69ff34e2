//! SQLite connection pool for the bird store.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Connection tunables applied to every pooled SQLite handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a statement waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Upper bound on open connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// Pool of SQLite connections handed to [`crate::BirdStore`].
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors raised while opening the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// r2d2 could not open the initial connections.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Opens the pool a [`crate::BirdStore`] draws from.
///
/// The store checks out one connection per `create_bird` or `get_birds`
/// call and returns it when the single statement finishes, so
/// `pool_max_size` caps how many store calls can touch SQLite at once.
/// Callers beyond that wait up to r2d2's connection timeout and then get
/// [`crate::StoreError::Connection`]. Writers that do get a connection
/// queue on SQLite's lock for at most `busy_timeout_ms`.
///
/// Connections run in WAL mode so `get_birds` readers never block an
/// in-flight insert. The file is created if missing, but the `birds`
/// table is not: provision it from `sql/birds.sql` first.
///
/// `":memory:"` gives every pooled connection its own private database,
/// so inserted birds are only visible to later calls that happen to reuse
/// the same connection. Use a file, or `pool_max_size = 1`.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the initial connections cannot be
/// opened or configured.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| configure_connection(conn, settings.busy_timeout_ms));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        max_size = settings.pool_max_size,
        "opened sqlite pool"
    );

    Ok(pool)
}

fn configure_connection(conn: &mut Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    // In-memory databases answer "memory" and cannot switch to WAL.
    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if journal_mode != "wal" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!(
                "failed to set WAL journal mode, got: {journal_mode}"
            )),
        ));
    }

    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    ))
}
