//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{
    BranchId, CompanyId, DocumentId, LedgerEntryId, ProductId, ShelfId,
};

use super::types::{Direction, TransactionType};

/// Ordering key that places ledger entries on a barcode's chronological chain.
///
/// Business date first, then creation time; the time-ordered entry id breaks
/// the remaining ties so the order is total.
pub type ChronologyKey = (NaiveDate, DateTime<Utc>, LedgerEntryId);

/// A single unit movement recorded in the inventory ledger.
///
/// Entries are append-only. The only way an entry disappears is when the
/// document line that created it is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// Tenant the entry belongs to.
    pub company_id: CompanyId,
    /// Branch where the movement happened.
    pub branch_id: BranchId,
    /// Shelf the unit was put on or taken from.
    pub shelf_id: ShelfId,
    /// Product the unit belongs to.
    pub product_id: ProductId,
    /// Unit identifier (physical barcode or receipt-line proxy).
    pub barcode: String,
    /// Receipt, delivery or return that owns this entry.
    pub transaction_id: DocumentId,
    /// Human-readable code of the owning document.
    pub transaction_code: String,
    /// Kind of the owning document.
    pub transaction_type: TransactionType,
    /// Business date of the movement.
    pub transaction_date: NaiveDate,
    /// Whether the unit came in or went out.
    pub direction: Direction,
    /// System timestamp, immutable once written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns `+1` for inbound and `-1` for outbound entries.
    #[must_use]
    pub fn signed_quantity(&self) -> i64 {
        self.direction.signed()
    }

    /// Returns true if the entry increases on-hand quantity.
    #[must_use]
    pub fn is_inbound(&self) -> bool {
        self.direction.is_inbound()
    }

    /// Returns the key that orders this entry on its barcode chain.
    #[must_use]
    pub fn chronology_key(&self) -> ChronologyKey {
        (self.transaction_date, self.created_at, self.id)
    }
}
