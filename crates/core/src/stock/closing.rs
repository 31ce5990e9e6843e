//! Period closing: carrying on-hand units into the next period's snapshot.
//!
//! Closing period P folds a base set of units with the ledger entries up to
//! the end of P. The base is P's own snapshot when one exists, otherwise the
//! newest earlier snapshot, otherwise nothing (whole history). Units whose
//! net position stays positive become the snapshot for P + 1.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use stockledger_shared::types::{BranchId, ProductId, ShelfId};

use super::period::StockPeriod;
use super::snapshot::SnapshotLine;
use crate::ledger::{ChronologyKey, LedgerEntry};

/// Which rows a closing run must read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingPlan {
    /// Period being closed.
    pub target: StockPeriod,
    /// Snapshot period used as the base, if any.
    pub base: Option<StockPeriod>,
    /// First transaction date to scan (inclusive); `None` scans from the start.
    pub scan_from: Option<NaiveDate>,
    /// Last transaction date to scan (inclusive).
    pub scan_to: NaiveDate,
}

impl ClosingPlan {
    /// Plans the closing of `target` given the newest snapshot period not
    /// after it.
    #[must_use]
    pub fn new(target: StockPeriod, latest_snapshot: Option<StockPeriod>) -> Self {
        let base = latest_snapshot.filter(|p| *p <= target);
        Self {
            target,
            base,
            scan_from: base.map(|p| p.first_day()),
            scan_to: target.last_day(),
        }
    }

    /// Period the produced snapshot is labelled with.
    #[must_use]
    pub const fn snapshot_period(&self) -> StockPeriod {
        self.target.next()
    }

    /// Returns true if the entry's date falls inside the scan window.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.scan_from.is_none_or(|from| date >= from) && date <= self.scan_to
    }
}

/// Net position and most recent location of one unit during a fold.
struct UnitState {
    net: i64,
    // None marks a snapshot fact, which precedes every ledger entry.
    latest: Option<ChronologyKey>,
    branch_id: BranchId,
    shelf_id: ShelfId,
}

/// Stateless service for the closing fold.
pub struct ClosingService;

impl ClosingService {
    /// Folds the base lines with the period's entries and returns the units
    /// still on hand, sorted by product then barcode.
    ///
    /// The carried branch and shelf are those of the chronologically latest
    /// contributing fact.
    #[must_use]
    pub fn carry_forward(base: &[SnapshotLine], entries: &[LedgerEntry]) -> Vec<SnapshotLine> {
        let mut units: BTreeMap<(ProductId, &str), UnitState> = BTreeMap::new();

        for line in base {
            let state = units
                .entry((line.product_id, line.barcode.as_str()))
                .or_insert(UnitState {
                    net: 0,
                    latest: None,
                    branch_id: line.branch_id,
                    shelf_id: line.shelf_id,
                });
            state.net += 1;
        }

        for entry in entries {
            let key = entry.chronology_key();
            let state = units
                .entry((entry.product_id, entry.barcode.as_str()))
                .or_insert(UnitState {
                    net: 0,
                    latest: Some(key),
                    branch_id: entry.branch_id,
                    shelf_id: entry.shelf_id,
                });
            state.net += entry.signed_quantity();
            if state.latest.is_none_or(|latest| key >= latest) {
                state.latest = Some(key);
                state.branch_id = entry.branch_id;
                state.shelf_id = entry.shelf_id;
            }
        }

        units
            .into_iter()
            .filter(|(_, state)| state.net > 0)
            .map(|((product_id, barcode), state)| SnapshotLine {
                product_id,
                barcode: barcode.to_string(),
                branch_id: state.branch_id,
                shelf_id: state.shelf_id,
            })
            .collect()
    }

    /// Compares a stored snapshot with a freshly computed one, ignoring order.
    #[must_use]
    pub fn same_details(stored: &[SnapshotLine], computed: &[SnapshotLine]) -> bool {
        if stored.len() != computed.len() {
            return false;
        }
        let mut a = stored.to_vec();
        let mut b = computed.to_vec();
        a.sort();
        b.sort();
        a == b
    }

    /// Groups lines by product, preserving barcode order within each product.
    #[must_use]
    pub fn by_product(lines: &[SnapshotLine]) -> BTreeMap<ProductId, Vec<&SnapshotLine>> {
        let mut grouped: BTreeMap<ProductId, Vec<&SnapshotLine>> = BTreeMap::new();
        for line in lines {
            grouped.entry(line.product_id).or_default().push(line);
        }
        grouped
    }
}
