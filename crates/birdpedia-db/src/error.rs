//! Error types for the bird store.

/// Errors returned by [`crate::Store`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool.
    #[error("store connection error: {0}")]
    Connection(#[from] r2d2::Error),

    /// The statement could not be prepared or executed, or the database
    /// rejected it.
    #[error("store query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// A row did not have the shape of a bird.
    #[error("store decode error: {0}")]
    Decode(rusqlite::Error),
}

impl StoreError {
    /// Classifies an error raised while stepping through or reading rows.
    ///
    /// Column type, index, name and conversion failures mean the row could
    /// not be mapped; everything else came from executing the query.
    pub(crate) fn from_row_error(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::FromSqlConversionFailure(..) => Self::Decode(err),
            other => Self::Query(other),
        }
    }
}
