//! Error types for the database layer

use meetbook_scheduling::SchedulingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database configuration error: {0}")]
    ConfigError(String),

    #[error("Database URL error: {0}")]
    UrlError(String),

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Database transaction error: {0}")]
    TransactionError(String),
}

impl DbError {
    pub(crate) fn corrupt(table: &'static str, message: impl std::fmt::Display) -> Self {
        DbError::CorruptRow {
            table,
            message: message.to_string(),
        }
    }
}

impl From<DbError> for SchedulingError {
    fn from(err: DbError) -> Self {
        SchedulingError::Storage(err.to_string())
    }
}
