//! Persistence for encyclopedia entries.
//!
//! [`BirdStore`] is a thin wrapper around a [`DbPool`]: every call checks
//! out one connection and issues exactly one statement against the `birds`
//! table. Nothing is retried, batched or cached.

use std::sync::Arc;

use birdpedia_types::Bird;
use rusqlite::{params, Row};

use crate::error::StoreError;
use crate::pool::DbPool;

const INSERT_BIRD: &str = "INSERT INTO birds (species, description) VALUES (?, ?)";
const SELECT_BIRDS: &str = "SELECT species, description FROM birds";

/// Operations the rest of the system needs from bird storage.
pub trait Store: Send + Sync {
    /// Persists one bird.
    fn create_bird(&self, bird: &Bird) -> Result<(), StoreError>;

    /// Returns every stored bird, in whatever order the database yields.
    fn get_birds(&self) -> Result<Vec<Bird>, StoreError>;
}

impl<T: Store + ?Sized> Store for Arc<T> {
    fn create_bird(&self, bird: &Bird) -> Result<(), StoreError> {
        (**self).create_bird(bird)
    }

    fn get_birds(&self) -> Result<Vec<Bird>, StoreError> {
        (**self).get_birds()
    }
}

/// SQLite-backed [`Store`].
#[derive(Clone)]
pub struct BirdStore {
    pool: DbPool,
}

impl BirdStore {
    /// Wraps an already-open pool. The `birds` table must exist.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Store for BirdStore {
    /// Inserts `bird` as a new row. Field contents are not validated.
    ///
    /// # Errors
    ///
    /// `StoreError::Connection` if no connection is available,
    /// `StoreError::Query` if the insert is rejected.
    fn create_bird(&self, bird: &Bird) -> Result<(), StoreError> {
        let conn = self.pool.get()?;

        conn.execute(INSERT_BIRD, params![bird.species, bird.description])
            .inspect_err(|e| {
                tracing::error!(error = %e, species = %bird.species, "failed to insert bird")
            })?;

        tracing::debug!(species = %bird.species, "inserted bird");
        Ok(())
    }

    /// Reads all rows of `birds`. An empty table yields an empty vector.
    ///
    /// # Errors
    ///
    /// `StoreError::Connection` if no connection is available,
    /// `StoreError::Query` if the select fails, `StoreError::Decode` if a
    /// row does not hold two TEXT columns.
    fn get_birds(&self) -> Result<Vec<Bird>, StoreError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(SELECT_BIRDS)?;
        let mut rows = stmt.query([])?;

        let mut birds = Vec::new();
        while let Some(row) = rows.next()? {
            let bird = bird_from_row(row).map_err(StoreError::from_row_error)?;
            birds.push(bird);
        }

        tracing::debug!(count = birds.len(), "listed birds");
        Ok(birds)
    }
}

/// Maps a `SELECT species, description` row. Both columns must be TEXT;
/// NULL or any other storage class is a decode failure.
fn bird_from_row(row: &Row<'_>) -> rusqlite::Result<Bird> {
    Ok(Bird {
        species: row.get::<_, String>(0)?,
        description: row.get::<_, String>(1)?,
    })
}
