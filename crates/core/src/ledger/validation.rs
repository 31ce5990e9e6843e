//! Business rule validation for ledger operations.

use super::error::LedgerError;
use super::types::NewLedgerEntry;

/// Validates that every required field of a new entry is present.
///
/// Ids must not be nil, and barcode and document code must contain
/// something other than whitespace.
///
/// # Errors
///
/// Returns `LedgerError::MissingField` naming the first empty field.
pub fn validate_new_entry(entry: &NewLedgerEntry) -> Result<(), LedgerError> {
    if entry.branch_id.is_nil() {
        return Err(LedgerError::MissingField("branch_id"));
    }
    if entry.shelf_id.is_nil() {
        return Err(LedgerError::MissingField("shelf_id"));
    }
    if entry.product_id.is_nil() {
        return Err(LedgerError::MissingField("product_id"));
    }
    validate_barcode(&entry.barcode)?;
    if entry.transaction_id.is_nil() {
        return Err(LedgerError::MissingField("transaction_id"));
    }
    if entry.transaction_code.trim().is_empty() {
        return Err(LedgerError::MissingField("transaction_code"));
    }
    Ok(())
}

/// Validates a barcode supplied on its own (lookups, custody checks, removals).
///
/// # Errors
///
/// Returns `LedgerError::MissingField` if the barcode is blank.
pub fn validate_barcode(barcode: &str) -> Result<(), LedgerError> {
    if barcode.trim().is_empty() {
        return Err(LedgerError::MissingField("barcode"));
    }
    Ok(())
}
