use thiserror::Error;

/// SQLite primary result codes that mean "another connection holds the lock".
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// The database stayed locked by another writer for longer than the busy timeout
    #[error("Database is locked: {message}")]
    Locked { message: String },

    /// Schema setup failed
    #[error("Failed to apply database migrations")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if is_lock_contention(db_err.code().as_deref()) => DbError::Locked {
                message: db_err.message().to_string(),
            },
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// SQLite reports extended result codes; the primary code lives in the low byte.
fn is_lock_contention(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i64>().ok())
        .map(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

pub type Result<T> = std::result::Result<T, DbError>;
