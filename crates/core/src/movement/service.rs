//! Expansion of movement documents into ledger entries.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::document::MovementDocument;
use crate::ledger::{LedgerError, NewLedgerEntry, TransactionType, validate_new_entry};

/// Stateless service turning documents into per-unit ledger inputs.
pub struct MovementService;

impl MovementService {
    /// Expands a document into one ledger input per line.
    ///
    /// Inbound lines without a barcode get a generated identifier standing in
    /// for the received unit. Outbound lines must name the unit they move.
    ///
    /// # Errors
    ///
    /// - `MissingField("lines")` for a document without lines
    /// - `MissingField("barcode")` for an outbound line without a barcode
    /// - `DuplicateBarcode` if a barcode appears twice
    /// - any field validation error of the produced entries
    pub fn entries(document: &MovementDocument) -> Result<Vec<NewLedgerEntry>, LedgerError> {
        if document.lines.is_empty() {
            return Err(LedgerError::MissingField("lines"));
        }

        let direction = document.direction();
        let mut seen: HashSet<String> = HashSet::with_capacity(document.lines.len());
        let mut entries = Vec::with_capacity(document.lines.len());

        for line in &document.lines {
            let barcode = match line.barcode.as_deref().map(str::trim) {
                Some(barcode) if !barcode.is_empty() => barcode.to_string(),
                _ if direction.is_inbound() => Uuid::now_v7().to_string(),
                _ => return Err(LedgerError::MissingField("barcode")),
            };

            if !seen.insert(barcode.clone()) {
                return Err(LedgerError::DuplicateBarcode(barcode));
            }

            let entry = NewLedgerEntry {
                branch_id: document.branch_id,
                shelf_id: line.shelf_id,
                product_id: line.product_id,
                barcode,
                transaction_id: document.transaction_id,
                transaction_code: document.code.clone(),
                transaction_type: document.transaction_type,
                transaction_date: document.date,
                direction,
            };
            validate_new_entry(&entry)?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

/// Formats a document code: type code, year, zero-padded month, sequence.
///
/// `sequence` is one more than the documents of that type the company has
/// already posted in the month.
#[must_use]
pub fn document_code(transaction_type: TransactionType, date: NaiveDate, sequence: u64) -> String {
    format!(
        "{}{:04}{:02}{}",
        transaction_type.code(),
        date.year(),
        date.month(),
        sequence
    )
}
