use std::time::Duration;

use marquee_types::ValidationErrors;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification callers use to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RecordNotFound,
    EditConflict,
    ValidationFailure,
    StorageFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid stored data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Edit conflict on record {id}, version {version} is not current")]
    EditConflict { id: i64, version: i32 },

    #[error("Validation failed: {0}")]
    ValidationFailure(#[from] ValidationErrors),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RecordNotFound(_) => ErrorKind::RecordNotFound,
            Error::EditConflict { .. } => ErrorKind::EditConflict,
            Error::ValidationFailure(_) => ErrorKind::ValidationFailure,
            Error::DatabaseError(_)
            | Error::MigrationError(_)
            | Error::Timeout(_)
            | Error::InvalidData(_) => ErrorKind::StorageFailure,
        }
    }
}
