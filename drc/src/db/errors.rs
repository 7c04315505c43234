use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

/// The constraint a rejected statement ran into, as reported by Postgres
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraint {
    pub name: Option<String>,
    pub table: Option<String>,
    pub detail: String,
}

impl From<&dyn DatabaseError> for Constraint {
    fn from(err: &dyn DatabaseError) -> Self {
        Self {
            name: err.constraint().map(str::to_string),
            table: err.table().map(str::to_string),
            detail: err.message().to_string(),
        }
    }
}

/// Errors from repositories and the content store
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violation: {}", .0.detail)]
    UniqueViolation(Constraint),

    #[error("Foreign key constraint violation: {}", .0.detail)]
    ForeignKeyViolation(Constraint),

    /// Includes NOT NULL violations
    #[error("Check constraint violation: {}", .0.detail)]
    CheckViolation(Constraint),

    /// Operation refused for this entity type, e.g. updating an immutable document
    #[error("{operation} cannot be applied to entity of type {entity_type}: {reason}")]
    ProtectedEntity {
        /// Verb as shown to clients, e.g. `update`
        operation: &'static str,
        reason: String,
        entity_type: String,
        entity_id: Option<String>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return match err {
                sqlx::Error::RowNotFound => DbError::NotFound,
                other => DbError::Other(other.into()),
            };
        };

        let constraint = Constraint::from(db_err.as_ref());
        match db_err.kind() {
            ErrorKind::UniqueViolation => DbError::UniqueViolation(constraint),
            ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation(constraint),
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => DbError::CheckViolation(constraint),
            _ => DbError::Other(err.into()),
        }
    }
}

/// Content store failures. A missing file is [`DbError::NotFound`].
impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            DbError::NotFound
        } else {
            DbError::Other(err.into())
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
