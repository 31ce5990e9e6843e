//! On-hand stock aggregation.
//!
//! Current stock is a snapshot base folded with the ledger entries recorded
//! since that snapshot. A barcode counts as on hand when its base membership
//! plus its signed movements is positive.

use std::collections::{BTreeMap, HashMap};

use stockledger_shared::types::ProductId;

use super::snapshot::SnapshotLine;
use crate::ledger::LedgerEntry;

/// Stateless service for stock aggregation.
pub struct StockService;

impl StockService {
    /// Folds base units and later movements into a net position per unit.
    ///
    /// Each base line contributes `+1`; each entry contributes its signed
    /// quantity. Callers apply any branch filter before calling.
    #[must_use]
    pub fn net_positions<'a>(
        base: &'a [SnapshotLine],
        entries: &'a [LedgerEntry],
    ) -> HashMap<(ProductId, &'a str), i64> {
        let mut positions: HashMap<(ProductId, &'a str), i64> = HashMap::new();

        for line in base {
            *positions
                .entry((line.product_id, line.barcode.as_str()))
                .or_default() += 1;
        }
        for entry in entries {
            *positions
                .entry((entry.product_id, entry.barcode.as_str()))
                .or_default() += entry.signed_quantity();
        }

        positions
    }

    /// Counts units on hand across every product present in the inputs.
    #[must_use]
    pub fn count_on_hand(base: &[SnapshotLine], entries: &[LedgerEntry]) -> u64 {
        Self::net_positions(base, entries)
            .values()
            .filter(|net| **net > 0)
            .fold(0, |count, _| count + 1)
    }

    /// Counts units on hand per product, omitting products with none.
    #[must_use]
    pub fn on_hand_by_product(
        base: &[SnapshotLine],
        entries: &[LedgerEntry],
    ) -> BTreeMap<ProductId, u64> {
        let mut totals: BTreeMap<ProductId, u64> = BTreeMap::new();
        for ((product_id, _), net) in Self::net_positions(base, entries) {
            if net > 0 {
                *totals.entry(product_id).or_default() += 1;
            }
        }
        totals
    }
}
