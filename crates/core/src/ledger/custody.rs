//! Barcode custody derived from the ledger chain.
//!
//! A barcode's custodian is never stored: it is the branch of the
//! chronologically latest entry for that barcode. These functions work on
//! entries already loaded for one `(company, barcode)` pair.

use stockledger_shared::types::BranchId;

use super::entry::LedgerEntry;
use super::error::LedgerError;

/// Stateless service for locating and checking barcode custody.
pub struct CustodyService;

impl CustodyService {
    /// Returns the chronologically latest entry of a barcode chain.
    pub fn latest<'a, I>(entries: I) -> Option<&'a LedgerEntry>
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        entries.into_iter().max_by_key(|e| e.chronology_key())
    }

    /// Sorts a barcode chain oldest first.
    #[must_use]
    pub fn chain(mut entries: Vec<LedgerEntry>) -> Vec<LedgerEntry> {
        entries.sort_by_key(LedgerEntry::chronology_key);
        entries
    }

    /// Checks that `expected_branch` may move the barcode out.
    ///
    /// `located` is the result of `Locate` for the barcode.
    ///
    /// # Errors
    ///
    /// - `BarcodeNotFound` if the barcode has no history
    /// - `CustodyConflict` if another branch holds it
    /// - `NotInStock` if its latest movement already took it out
    pub fn verify(
        located: Option<&LedgerEntry>,
        barcode: &str,
        expected_branch: BranchId,
    ) -> Result<(), LedgerError> {
        let Some(latest) = located else {
            return Err(LedgerError::BarcodeNotFound(barcode.to_string()));
        };

        if latest.branch_id != expected_branch {
            return Err(LedgerError::CustodyConflict {
                barcode: barcode.to_string(),
                expected: expected_branch,
                actual: latest.branch_id,
            });
        }

        if !latest.is_inbound() {
            return Err(LedgerError::NotInStock {
                barcode: barcode.to_string(),
                branch: latest.branch_id,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{Direction, TransactionType};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use stockledger_shared::types::{CompanyId, DocumentId, LedgerEntryId, ProductId, ShelfId};

    fn make_entry(branch: BranchId, direction: Direction, day: u32, second: i64) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            company_id: CompanyId::new(),
            branch_id: branch,
            shelf_id: ShelfId::new(),
            product_id: ProductId::new(),
            barcode: "bc1".to_string(),
            transaction_id: DocumentId::new(),
            transaction_code: "GR2024011".to_string(),
            transaction_type: TransactionType::GoodsReceipt,
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            direction,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
                + Duration::seconds(second),
        }
    }

    #[test]
    fn test_latest_orders_by_transaction_date_first() {
        let a = BranchId::new();
        let b = BranchId::new();
        // Created later but dated earlier: the business date wins.
        let dated_later = make_entry(a, Direction::Inbound, 20, 0);
        let created_later = make_entry(b, Direction::Inbound, 5, 100);

        let entries = [dated_later.clone(), created_later];
        let latest = CustodyService::latest(&entries).unwrap();
        assert_eq!(latest.id, dated_later.id);
    }

    #[test]
    fn test_latest_breaks_same_day_ties_by_creation_time() {
        let a = BranchId::new();
        let first = make_entry(a, Direction::Inbound, 5, 0);
        let second = make_entry(a, Direction::Outbound, 5, 10);

        let entries = [second.clone(), first];
        assert_eq!(CustodyService::latest(&entries).unwrap().id, second.id);
    }

    #[test]
    fn test_latest_of_empty_chain() {
        let entries: Vec<LedgerEntry> = Vec::new();
        assert!(CustodyService::latest(&entries).is_none());
    }

    #[test]
    fn test_chain_is_oldest_first() {
        let a = BranchId::new();
        let e1 = make_entry(a, Direction::Inbound, 1, 0);
        let e2 = make_entry(a, Direction::Outbound, 2, 0);
        let e3 = make_entry(a, Direction::Inbound, 3, 0);

        let chain = CustodyService::chain(vec![e3.clone(), e1.clone(), e2.clone()]);
        let ids: Vec<_> = chain.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![e1.id, e2.id, e3.id]);
    }

    #[test]
    fn test_verify_without_history() {
        let result = CustodyService::verify(None, "bc1", BranchId::new());
        assert!(matches!(result, Err(LedgerError::BarcodeNotFound(b)) if b == "bc1"));
    }

    #[test]
    fn test_verify_other_branch() {
        let holder = BranchId::new();
        let other = BranchId::new();
        let entry = make_entry(holder, Direction::Inbound, 5, 0);

        let result = CustodyService::verify(Some(&entry), "bc1", other);
        assert!(matches!(
            result,
            Err(LedgerError::CustodyConflict { expected, actual, .. })
                if expected == other && actual == holder
        ));
    }

    #[test]
    fn test_verify_own_branch() {
        let holder = BranchId::new();
        let entry = make_entry(holder, Direction::Inbound, 5, 0);
        assert!(CustodyService::verify(Some(&entry), "bc1", holder).is_ok());
    }

    #[test]
    fn test_verify_already_shipped() {
        let holder = BranchId::new();
        let entry = make_entry(holder, Direction::Outbound, 20, 0);

        let result = CustodyService::verify(Some(&entry), "bc1", holder);
        assert!(matches!(result, Err(LedgerError::NotInStock { .. })));
    }
}
