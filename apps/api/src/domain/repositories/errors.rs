use thiserror::Error;

/// Errors raised by repository implementations
///
/// `Invariant` aborts the surrounding transaction: the caller asked for
/// something the data model does not allow.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Invariant(String),

    #[error("{0}")]
    Conflict(String),
}

/// Unique and foreign key violations map to `Conflict` and `Invariant`
impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(format!("Already exists: {}", db.message()));
            }
            if db.is_foreign_key_violation() {
                return Self::Invariant("Referenced row does not exist".to_string());
            }
        }

        Self::Database(err)
    }
}

impl RepositoryError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
