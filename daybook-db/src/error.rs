use thiserror::Error;

/// Failure taxonomy for maintenance operations.
///
/// Not-found is deliberately absent: an empty scope is an empty success,
/// never an error. All variants are terminal for the current run; the
/// operator investigates and re-runs.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// The database could not be reached or opened.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// A foreign-key or uniqueness constraint was violated mid-operation.
    /// The surrounding transaction has been rolled back.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The post-condition check after deduplication did not hold: the scope
    /// still contains rows sharing a text key. This indicates a concurrent
    /// writer or a normalization mismatch and must not be retried blindly.
    #[error(
        "verification failed for {scope}: {distinct} distinct texts across {total} rows after cleanup"
    )]
    Verification {
        scope: String,
        distinct: usize,
        total: usize,
    },

    /// Any other database error, with the transaction rolled back.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl MaintenanceError {
    /// Classify a rusqlite error, separating constraint violations from the
    /// rest so callers can report them distinctly.
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                MaintenanceError::Constraint(err.to_string())
            }
            _ => MaintenanceError::Database(err),
        }
    }
}
