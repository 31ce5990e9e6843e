//! Error type shared by the inventory repositories.

use sea_orm::{DbErr, SqlErr};
use stockledger_core::ledger::{ErrorKind, LedgerError};
use stockledger_shared::AppError;

/// Error types for inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Business-rule or validation failure from the ledger domain.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl InventoryError {
    /// Returns the kind this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(err) => err.kind(),
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for caller-facing responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP-style status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ledger(err) => err.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true when re-running the whole transaction may succeed.
    ///
    /// Only transient store failures qualify: lost connections, deadlocks,
    /// serialization failures, and a closing insert that lost the race to
    /// another run (the retry then finds the stored snapshot).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        let Self::Database(err) = self else {
            return false;
        };

        if matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) {
            return true;
        }
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return true;
        }

        let message = err.to_string();
        message.contains("deadlock detected")
            || message.contains("could not serialize access")
            || message.contains("database is locked")
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Ledger(err) => err.into(),
            InventoryError::Database(err) => Self::Database(err.to_string()),
        }
    }
}
