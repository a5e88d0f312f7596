//! # Storage Errors
//!
//! ```text
//! sqlx::Error ──► DbError ◄── CoreError (rule broken inside a write)
//!                    │
//!                    ▼
//!        ApiError in apps/api (code + HTTP status)
//! ```
//!
//! Constraint failures are classified by SQLite's error kind so handlers can
//! answer 404 / 409 instead of a generic 500.

use duka_core::CoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row (cashier email, shop name...).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A reference points nowhere, or a delete would orphan sales,
    /// products or cashiers.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The row changed between read and write (two repayments racing on
    /// one credit).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A business rule failed mid-write: stock ran out during a sale, a
    /// repayment exceeded the balance.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Could not open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// Statement rejected by SQLite for any other reason.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every connection stayed busy past the acquire timeout.
    #[error("No database connection available")]
    PoolExhausted,

    #[error("Database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a [`DbError::UniqueViolation`].
    ///
    /// SQLite names only the column, so callers that know what they tried
    /// to insert attach it here.
    pub fn with_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // "UNIQUE constraint failed: cashiers.email"
                    ErrorKind::UniqueViolation => {
                        let field = message
                            .strip_prefix("UNIQUE constraint failed: ")
                            .unwrap_or(&message)
                            .to_string();
                        DbError::duplicate(field, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    _ => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_value_only_touches_duplicates() {
        let err = DbError::duplicate("cashiers.email", "unknown").with_value("a@b.co");
        assert_eq!(
            err.to_string(),
            "Duplicate cashiers.email: 'a@b.co' already exists"
        );

        let err = DbError::not_found("Shop", "s-1").with_value("x");
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: DbError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
    }
}
