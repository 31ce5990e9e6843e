//! End-to-end tests over the repositories.
//!
//! Tests the full flow: append → locate → verify custody → close → current stock,
//! and that closed months refuse back-dated changes.

use chrono::Duration;
use proptest::prelude::*;
use stockledger_core::ledger::{Direction, LedgerError};
use stockledger_core::stock::{SnapshotLine, StockPeriod};
use stockledger_shared::types::{BranchId, ProductId, ShelfId};
use uuid::Uuid;

use super::snapshot;
use super::{ClosingRepository, InventoryError, LedgerRepository, StockRepository};
use crate::test_utils::{date, movement, setup_db, tenant};

fn period(year: i32, month: u32) -> StockPeriod {
    StockPeriod::new(year, month).unwrap()
}

fn unit(product: ProductId, barcode: &str, branch: BranchId) -> SnapshotLine {
    SnapshotLine {
        product_id: product,
        barcode: barcode.to_string(),
        branch_id: branch,
        shelf_id: ShelfId::from_uuid(branch.into_inner()),
    }
}

// ========================================================================
// Scenarios
// ========================================================================

#[tokio::test]
async fn test_receive_check_custody_and_ship() {
    let db = setup_db().await;
    let ledger = LedgerRepository::new(db.clone());
    let stock = StockRepository::new(db);
    let ctx = tenant();
    let p1 = ProductId::new();
    let (b1, b2) = (BranchId::new(), BranchId::new());

    ledger
        .append(&ctx, movement(p1, "bc1", b1, Direction::Inbound, date(2024, 1, 5)))
        .await
        .unwrap();

    assert_eq!(ledger.locate(&ctx, "bc1").await.unwrap().branch_id, b1);

    let err = ledger.verify_custody(&ctx, "bc1", b2).await.unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Ledger(LedgerError::CustodyConflict { .. })
    ));

    ledger.verify_custody(&ctx, "bc1", b1).await.unwrap();
    ledger
        .append(&ctx, movement(p1, "bc1", b1, Direction::Outbound, date(2024, 1, 20)))
        .await
        .unwrap();

    assert_eq!(stock.current_stock(&ctx, p1, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_closing_merges_snapshot_and_new_receipt() {
    let db = setup_db().await;
    let ledger = LedgerRepository::new(db.clone());
    let closing = ClosingRepository::new(db.clone());
    let ctx = tenant();
    let p1 = ProductId::new();
    let b1 = BranchId::new();

    snapshot::insert_lines(&db, ctx.company_id, period(2024, 1), &[unit(p1, "bc1", b1)])
        .await
        .unwrap();
    ledger
        .append(&ctx, movement(p1, "bc2", b1, Direction::Inbound, date(2024, 1, 10)))
        .await
        .unwrap();

    closing.close_period(&ctx, Some(2024), Some(1)).await.unwrap();

    let feb = closing
        .snapshot_details(&ctx, period(2024, 2), None)
        .await
        .unwrap();
    assert_eq!(feb, vec![unit(p1, "bc1", b1), unit(p1, "bc2", b1)]);
}

#[tokio::test]
async fn test_closing_drops_shipped_and_adds_received_units() {
    let db = setup_db().await;
    let ledger = LedgerRepository::new(db.clone());
    let closing = ClosingRepository::new(db.clone());
    let ctx = tenant();
    let p = ProductId::new();
    let (x, y) = (BranchId::new(), BranchId::new());

    for barcode in ["A", "B"] {
        ledger
            .append(&ctx, movement(p, barcode, x, Direction::Inbound, date(2024, 2, 20)))
            .await
            .unwrap();
    }
    snapshot::insert_lines(
        &db,
        ctx.company_id,
        period(2024, 3),
        &[unit(p, "A", x), unit(p, "B", x)],
    )
    .await
    .unwrap();
    ledger
        .append(&ctx, movement(p, "A", x, Direction::Outbound, date(2024, 3, 8)))
        .await
        .unwrap();
    ledger
        .append(&ctx, movement(p, "C", y, Direction::Inbound, date(2024, 3, 9)))
        .await
        .unwrap();

    closing.close(&ctx, period(2024, 3)).await.unwrap();

    let april = closing
        .snapshot_details(&ctx, period(2024, 4), None)
        .await
        .unwrap();
    assert_eq!(april, vec![unit(p, "B", x), unit(p, "C", y)]);
}

#[tokio::test]
async fn test_second_outbound_from_other_branch_is_not_appended() {
    let db = setup_db().await;
    let ledger = LedgerRepository::new(db.clone());
    let ctx = tenant();
    let p1 = ProductId::new();
    let (a, b) = (BranchId::new(), BranchId::new());

    ledger
        .append(&ctx, movement(p1, "bc1", a, Direction::Inbound, date(2024, 1, 5)))
        .await
        .unwrap();

    let result = ledger
        .append(&ctx, movement(p1, "bc1", b, Direction::Outbound, date(2024, 1, 20)))
        .await;
    assert!(matches!(
        result,
        Err(InventoryError::Ledger(LedgerError::CustodyConflict { .. }))
    ));
    assert_eq!(ledger.history(&ctx, "bc1").await.unwrap().len(), 1);
    assert_eq!(ledger.locate(&ctx, "bc1").await.unwrap().branch_id, a);
}

#[tokio::test]
async fn test_closed_month_stays_consistent_with_history() {
    let db = setup_db().await;
    let ledger = LedgerRepository::new(db.clone());
    let stock = StockRepository::new(db.clone());
    let closing = ClosingRepository::new(db);
    let ctx = tenant();
    let p1 = ProductId::new();
    let b1 = BranchId::new();

    ledger
        .append(&ctx, movement(p1, "bc1", b1, Direction::Inbound, date(2024, 1, 5)))
        .await
        .unwrap();
    closing.close(&ctx, period(2024, 1)).await.unwrap();

    let err = ledger
        .append(&ctx, movement(p1, "bc2", b1, Direction::Inbound, date(2024, 1, 25)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Ledger(LedgerError::PeriodClosed(p)) if p == period(2024, 1)
    ));

    // Snapshot-based stock and the full history agree.
    let history = ledger.history(&ctx, "bc1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(ledger.locate(&ctx, "bc2").await.is_err());
    assert_eq!(stock.current_stock(&ctx, p1, None).await.unwrap(), 1);
}

// ========================================================================
// Property Tests
// ========================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

/// A move attempt: inbound or outbound at one of three branches.
fn step_strategy() -> impl Strategy<Value = (bool, u128)> {
    (any::<bool>(), 1u128..=3)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Locate always reports the branch of the latest accepted movement.
    #[test]
    fn prop_locate_follows_accepted_movements(
        steps in prop::collection::vec(step_strategy(), 1..12),
    ) {
        block_on(async {
            let db = setup_db().await;
            let ledger = LedgerRepository::new(db);
            let ctx = tenant();
            let p1 = ProductId::new();
            let mut expected: Option<BranchId> = None;

            for (i, (inbound, branch)) in steps.iter().enumerate() {
                let branch_id = BranchId::from_uuid(Uuid::from_u128(*branch));
                let day = date(2024, 1, 1) + Duration::days(i64::try_from(i).unwrap());
                let direction = if *inbound { Direction::Inbound } else { Direction::Outbound };

                // Outbound attempts without custody are refused and leave no row.
                if ledger
                    .append(&ctx, movement(p1, "bc", branch_id, direction, day))
                    .await
                    .is_ok()
                {
                    expected = Some(branch_id);
                } else {
                    assert!(!*inbound);
                }
            }

            let located = ledger.locate(&ctx, "bc").await.ok().map(|e| e.branch_id);
            assert_eq!(located, expected);
        });
    }

    /// Closing any prefix of months never changes current stock.
    #[test]
    fn prop_closing_never_changes_current_stock(
        moves in prop::collection::vec((0usize..4, 0i64..90, 1u128..=2), 1..16),
        closed_months in 1u32..=3,
    ) {
        block_on(async {
            let db = setup_db().await;
            let ledger = LedgerRepository::new(db.clone());
            let stock = StockRepository::new(db.clone());
            let closing = ClosingRepository::new(db);
            let ctx = tenant();
            let p1 = ProductId::new();
            let mut held_by: [Option<BranchId>; 4] = [None; 4];
            let mut last_day = [0i64; 4];

            for (unit, offset, branch) in moves {
                // Keep each barcode's chain in date order and alternating;
                // a unit ships from the branch that received it.
                let day = offset.max(last_day[unit]);
                last_day[unit] = day;
                let (direction, branch_id) = match held_by[unit] {
                    Some(holder) => {
                        held_by[unit] = None;
                        (Direction::Outbound, holder)
                    }
                    None => {
                        let receiver = BranchId::from_uuid(Uuid::from_u128(branch));
                        held_by[unit] = Some(receiver);
                        (Direction::Inbound, receiver)
                    }
                };
                ledger
                    .append(
                        &ctx,
                        movement(
                            p1,
                            &format!("bc{unit}"),
                            branch_id,
                            direction,
                            date(2024, 1, 1) + Duration::days(day),
                        ),
                    )
                    .await
                    .unwrap();
            }

            let expected = held_by.iter().filter(|holder| holder.is_some()).count() as u64;
            assert_eq!(stock.current_stock(&ctx, p1, None).await.unwrap(), expected);

            let mut target = period(2024, 1);
            for _ in 0..closed_months {
                closing.close(&ctx, target).await.unwrap();
                assert_eq!(stock.current_stock(&ctx, p1, None).await.unwrap(), expected);
                target = target.next();
            }
        });
    }
}
