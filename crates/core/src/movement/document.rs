//! Movement documents as seen by the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{BranchId, DocumentId, ProductId, ShelfId};

use crate::ledger::{Direction, TransactionType};

/// A receipt, delivery or return reduced to the fields the ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDocument {
    /// Id of the owning record.
    pub transaction_id: DocumentId,
    /// Human-readable document code, e.g. `DO2024013`.
    pub code: String,
    /// Kind of document.
    pub transaction_type: TransactionType,
    /// Business date of the movement.
    pub date: NaiveDate,
    /// Branch the units arrive at or leave from.
    pub branch_id: BranchId,
    /// One line per unit.
    pub lines: Vec<MovementLine>,
}

/// One unit moved by a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLine {
    /// Product of the unit.
    pub product_id: ProductId,
    /// Shelf the unit is put on or taken from.
    pub shelf_id: ShelfId,
    /// Unit barcode. Inbound lines may omit it.
    pub barcode: Option<String>,
}

impl MovementDocument {
    /// Direction every line of this document moves in.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.transaction_type.direction()
    }
}
