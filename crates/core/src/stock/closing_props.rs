//! Property-based tests for period closing.
//!
//! - Closing never changes the on-hand answer, only the rows it reads
//! - Closing the same inputs twice yields the same snapshot

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use stockledger_shared::types::{BranchId, CompanyId, DocumentId, LedgerEntryId, ProductId, ShelfId};
use uuid::Uuid;

use super::aggregate::StockService;
use super::closing::{ClosingPlan, ClosingService};
use super::period::StockPeriod;
use super::snapshot::SnapshotLine;
use crate::ledger::{Direction, LedgerEntry, TransactionType};

/// One barcode's life: product, and (day offset, branch) per movement.
type UnitHistory = (u128, Vec<(i64, u128)>);

/// Strategy to generate the movement days and branches of one barcode.
fn unit_history() -> impl Strategy<Value = UnitHistory> {
    (
        1u128..=2,
        prop::collection::vec((0i64..91, 1u128..=3), 1..8),
    )
}

/// Expands histories into a valid chain per barcode: movements alternate
/// inbound and outbound in date order, starting inbound.
fn build_entries(histories: &[UnitHistory]) -> Vec<LedgerEntry> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut entries = Vec::new();

    for (unit, (product, moves)) in histories.iter().enumerate() {
        let mut moves = moves.clone();
        moves.sort_by_key(|(day, _)| *day);
        for (step, (day, branch)) in moves.iter().enumerate() {
            let direction = if step % 2 == 0 {
                Direction::Inbound
            } else {
                Direction::Outbound
            };
            let transaction_type = if direction.is_inbound() {
                TransactionType::GoodsReceipt
            } else {
                TransactionType::DeliveryOrder
            };
            let branch_id = BranchId::from_uuid(Uuid::from_u128(*branch));
            entries.push(LedgerEntry {
                id: LedgerEntryId::new(),
                company_id: CompanyId::from_uuid(Uuid::from_u128(99)),
                branch_id,
                shelf_id: ShelfId::from_uuid(Uuid::from_u128(*branch)),
                product_id: ProductId::from_uuid(Uuid::from_u128(*product)),
                barcode: format!("BC-{unit}"),
                transaction_id: DocumentId::new(),
                transaction_code: format!("{}2024011", transaction_type.code()),
                transaction_type,
                transaction_date: start + Duration::days(*day),
                direction,
                created_at: epoch + Duration::seconds(i64::try_from(step).unwrap()),
            });
        }
    }

    entries
}

/// Runs successive closings from January up to (excluding) `upto`.
fn close_until(entries: &[LedgerEntry], upto: StockPeriod) -> (Option<StockPeriod>, Vec<SnapshotLine>) {
    let mut snapshot: Option<StockPeriod> = None;
    let mut lines: Vec<SnapshotLine> = Vec::new();
    let mut target = StockPeriod::new(2024, 1).unwrap();

    while target < upto {
        let plan = ClosingPlan::new(target, snapshot);
        let window: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| plan.covers(e.transaction_date))
            .cloned()
            .collect();
        lines = ClosingService::carry_forward(&lines, &window);
        snapshot = Some(plan.snapshot_period());
        target = target.next();
    }

    (snapshot, lines)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Stock computed from a snapshot plus later entries equals stock from full history.
    #[test]
    fn prop_closing_never_changes_the_answer(
        histories in prop::collection::vec(unit_history(), 1..8),
        months in 1u32..=3,
    ) {
        let entries = build_entries(&histories);
        let full = StockService::count_on_hand(&[], &entries);
        let full_by_product = StockService::on_hand_by_product(&[], &entries);

        let upto = StockPeriod::new(2024, 1 + months).unwrap();
        let (snapshot, lines) = close_until(&entries, upto);
        let from = snapshot.map(|p| p.first_day());
        let since: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| from.is_none_or(|d| e.transaction_date >= d))
            .cloned()
            .collect();

        prop_assert_eq!(StockService::count_on_hand(&lines, &since), full);
        prop_assert_eq!(StockService::on_hand_by_product(&lines, &since), full_by_product);
    }

    /// A single closing over an earlier base equals closing month by month.
    #[test]
    fn prop_skipped_months_close_the_same(
        histories in prop::collection::vec(unit_history(), 1..8),
    ) {
        let entries = build_entries(&histories);
        let (_, monthly) = close_until(&entries, StockPeriod::new(2024, 3).unwrap());

        let feb = StockPeriod::new(2024, 2).unwrap();
        let plan = ClosingPlan::new(feb, None);
        let window: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| plan.covers(e.transaction_date))
            .cloned()
            .collect();
        let direct = ClosingService::carry_forward(&[], &window);

        let units = |lines: &[SnapshotLine]| {
            lines.iter().map(|l| (l.product_id, l.barcode.clone())).collect::<Vec<_>>()
        };
        prop_assert_eq!(units(&monthly), units(&direct));
    }

    /// Re-running a closing over the same rows, in any order, is a no-op.
    #[test]
    fn prop_closing_is_idempotent(
        histories in prop::collection::vec(unit_history(), 1..8),
    ) {
        let entries = build_entries(&histories);
        let first = ClosingService::carry_forward(&[], &entries);

        let mut reversed = entries.clone();
        reversed.reverse();
        let second = ClosingService::carry_forward(&[], &reversed);

        prop_assert!(ClosingService::same_details(&first, &second));
        prop_assert_eq!(first, second);
    }
}
