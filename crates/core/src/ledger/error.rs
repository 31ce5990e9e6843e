//! Ledger error types for validation, custody and closing errors.
//!
//! Every error belongs to one of four kinds (see [`ErrorKind`]); callers
//! abort their transaction on any of them.

use stockledger_shared::AppError;
use stockledger_shared::types::{BranchId, DocumentId};
use thiserror::Error;

use crate::stock::period::StockPeriod;

/// Coarse classification of ledger errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field is missing or a request is malformed.
    Validation,
    /// A barcode, entry or snapshot does not exist.
    NotFound,
    /// The outbound branch is not the barcode's current custodian.
    CustodyConflict,
    /// Store or transport failure.
    Internal,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A required field is empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field holds a value outside its domain.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Year/month pair does not name a calendar month.
    #[error("Invalid period {year}-{month}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },

    /// The same barcode appears twice in one document.
    #[error("Barcode {0} appears more than once in the document")]
    DuplicateBarcode(String),

    /// A period was closed before and back-dated activity changed its result.
    #[error("Period {0} is already closed and its ledger has changed since")]
    PeriodAlreadyClosed(StockPeriod),

    /// A movement dated in a closed period was appended or removed.
    #[error("Period {0} is closed; its movements can no longer change")]
    PeriodClosed(StockPeriod),

    /// A document line cannot be removed while later movements depend on it.
    #[error("Barcode {barcode} has movements after transaction {transaction_id}")]
    LaterMovementExists {
        /// Owning document.
        transaction_id: DocumentId,
        /// Barcode of the line.
        barcode: String,
    },

    // ========== Not Found Errors ==========
    /// The barcode has no ledger history for this company.
    #[error("Barcode {0} has no stock history")]
    BarcodeNotFound(String),

    /// No ledger entry belongs to the given document line.
    #[error("No ledger entry for barcode {barcode} in transaction {transaction_id}")]
    EntryNotFound {
        /// Owning document.
        transaction_id: DocumentId,
        /// Barcode of the line.
        barcode: String,
    },

    /// No snapshot exists for the period.
    #[error("No stock snapshot for period {0}")]
    SnapshotNotFound(StockPeriod),

    // ========== Custody Errors ==========
    /// The barcode is held by another branch.
    #[error("Barcode {barcode} is held by branch {actual}, not {expected}")]
    CustodyConflict {
        /// The barcode being moved.
        barcode: String,
        /// Branch the caller claims to move it from.
        expected: BranchId,
        /// Branch that actually holds it.
        actual: BranchId,
    },

    /// The barcode's latest movement already took it out of stock.
    #[error("Barcode {barcode} already left stock at branch {branch}")]
    NotInStock {
        /// The barcode being moved.
        barcode: String,
        /// Branch of the last outbound movement.
        branch: BranchId,
    },
}

impl LedgerError {
    /// Returns the kind this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::InvalidPeriod { .. }
            | Self::DuplicateBarcode(_)
            | Self::PeriodAlreadyClosed(_)
            | Self::PeriodClosed(_)
            | Self::LaterMovementExists { .. } => ErrorKind::Validation,
            Self::BarcodeNotFound(_) | Self::EntryNotFound { .. } | Self::SnapshotNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::CustodyConflict { .. } | Self::NotInStock { .. } => ErrorKind::CustodyConflict,
        }
    }

    /// Returns the error code for caller-facing responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::DuplicateBarcode(_) => "DUPLICATE_BARCODE",
            Self::PeriodAlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::LaterMovementExists { .. } => "LATER_MOVEMENT_EXISTS",
            Self::BarcodeNotFound(_) => "BARCODE_NOT_FOUND",
            Self::EntryNotFound { .. } => "ENTRY_NOT_FOUND",
            Self::SnapshotNotFound(_) => "SNAPSHOT_NOT_FOUND",
            Self::CustodyConflict { .. } => "CUSTODY_CONFLICT",
            Self::NotInStock { .. } => "NOT_IN_STOCK",
        }
    }

    /// Returns the HTTP-style status code for this error.
    ///
    /// Custody errors are permission-style: the stock is not the caller's.
    /// Requests that clash with closed periods or later movements are 409.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        if self.is_conflict() {
            return 409;
        }
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::CustodyConflict => 403,
            ErrorKind::Internal => 500,
        }
    }

    fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::PeriodAlreadyClosed(_) | Self::PeriodClosed(_) | Self::LaterMovementExists { .. }
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        if err.is_conflict() {
            return Self::Conflict(message);
        }
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::CustodyConflict => Self::Forbidden(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }
}
