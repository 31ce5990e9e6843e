//! Snapshot facts and closing results.

use serde::{Deserialize, Serialize};
use stockledger_shared::types::{BranchId, CompanyId, ProductId, ShelfId};

use super::period::StockPeriod;

/// One on-hand unit materialized by a closing run.
///
/// Each line is worth exactly one unit; there is no quantity field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotLine {
    /// Product the unit belongs to.
    pub product_id: ProductId,
    /// Barcode of the unit; also used as the detail code.
    pub barcode: String,
    /// Branch holding the unit at the start of the period.
    pub branch_id: BranchId,
    /// Shelf the unit was last put on.
    pub shelf_id: ShelfId,
}

/// Outcome of closing one period for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingSummary {
    /// Company that was closed.
    pub company_id: CompanyId,
    /// Period whose activity was folded.
    pub closed_period: StockPeriod,
    /// Period the resulting snapshot is labelled with.
    pub snapshot_period: StockPeriod,
    /// Number of products with at least one unit carried forward.
    pub products: usize,
    /// Number of units carried forward.
    pub units: usize,
    /// True when an identical snapshot already existed and nothing was written.
    pub already_closed: bool,
}

impl ClosingSummary {
    /// Builds a summary from the carried-forward lines.
    #[must_use]
    pub fn from_lines(
        company_id: CompanyId,
        closed_period: StockPeriod,
        lines: &[SnapshotLine],
        already_closed: bool,
    ) -> Self {
        let mut products: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        products.sort_unstable();
        products.dedup();

        Self {
            company_id,
            closed_period,
            snapshot_period: closed_period.next(),
            products: products.len(),
            units: lines.len(),
            already_closed,
        }
    }
}
