//! Property-based tests for barcode custody.
//!
//! - The located entry does not depend on the order rows come back in
//! - A barcode accepted for outbound cannot be shipped again until it returns

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use stockledger_shared::types::{BranchId, CompanyId, DocumentId, LedgerEntryId, ProductId, ShelfId};
use uuid::Uuid;

use super::custody::CustodyService;
use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::types::{Direction, TransactionType};

/// A step in a simulated barcode life: move in or try to move out at a branch.
#[derive(Debug, Clone, Copy)]
enum Step {
    In(usize),
    Out(usize),
}

fn branches() -> [BranchId; 3] {
    [
        BranchId::from_uuid(Uuid::from_u128(1)),
        BranchId::from_uuid(Uuid::from_u128(2)),
        BranchId::from_uuid(Uuid::from_u128(3)),
    ]
}

/// Strategy to generate steps across three branches.
fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![(0usize..3).prop_map(Step::In), (0usize..3).prop_map(Step::Out)]
}

/// Helper to create an entry on a fixed barcode.
fn make_entry(branch: BranchId, direction: Direction, day_offset: i64, second: i64) -> LedgerEntry {
    let transaction_type = if direction.is_inbound() {
        TransactionType::GoodsReceipt
    } else {
        TransactionType::DeliveryOrder
    };
    LedgerEntry {
        id: LedgerEntryId::new(),
        company_id: CompanyId::from_uuid(Uuid::from_u128(9)),
        branch_id: branch,
        shelf_id: ShelfId::new(),
        product_id: ProductId::from_uuid(Uuid::from_u128(7)),
        barcode: "BC-PROP".to_string(),
        transaction_id: DocumentId::new(),
        transaction_code: format!("{}2024011", transaction_type.code()),
        transaction_type,
        transaction_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day_offset),
        direction,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(second),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The located entry is the chronological maximum whatever the input order.
    #[test]
    fn prop_latest_is_order_independent(
        days in prop::collection::vec(0i64..60, 1..20),
        rotate in 0usize..20,
    ) {
        let [a, _, _] = branches();
        let entries: Vec<LedgerEntry> = days
            .iter()
            .enumerate()
            .map(|(i, d)| make_entry(a, Direction::Inbound, *d, i64::try_from(i).unwrap()))
            .collect();

        let expected = CustodyService::chain(entries.clone()).last().map(|e| e.id);

        let mut shuffled = entries;
        let len = shuffled.len();
        shuffled.rotate_left(rotate % len);
        shuffled.reverse();

        prop_assert_eq!(CustodyService::latest(&shuffled).map(|e| e.id), expected);
    }

    /// Accepted outbound movements never ship a unit that is not on hand.
    #[test]
    fn prop_no_double_ship(steps in prop::collection::vec(step_strategy(), 1..40)) {
        let branch_ids = branches();
        let mut chain: Vec<LedgerEntry> = Vec::new();
        let mut on_hand = false;

        for (i, step) in steps.iter().enumerate() {
            let offset = i64::try_from(i).unwrap();
            match *step {
                Step::In(b) => {
                    chain.push(make_entry(branch_ids[b], Direction::Inbound, offset, 0));
                    on_hand = true;
                }
                Step::Out(b) => {
                    let located = CustodyService::latest(&chain);
                    let verdict = CustodyService::verify(located, "BC-PROP", branch_ids[b]);
                    match verdict {
                        Ok(()) => {
                            prop_assert!(on_hand);
                            prop_assert_eq!(located.map(|e| e.branch_id), Some(branch_ids[b]));
                            chain.push(make_entry(branch_ids[b], Direction::Outbound, offset, 0));
                            on_hand = false;
                        }
                        Err(LedgerError::BarcodeNotFound(_)) => prop_assert!(chain.is_empty()),
                        Err(LedgerError::CustodyConflict { actual, .. }) => {
                            prop_assert_ne!(actual, branch_ids[b]);
                        }
                        Err(LedgerError::NotInStock { .. }) => prop_assert!(!on_hand),
                        Err(other) => prop_assert!(false, "unexpected error: {other}"),
                    }
                }
            }
        }

        let signed: i64 = chain.iter().map(LedgerEntry::signed_quantity).sum();
        let outbound = chain.iter().filter(|e| !e.is_inbound()).count();
        let inbound = chain.len() - outbound;
        prop_assert!(outbound <= inbound);
        prop_assert!(signed >= 0);
    }
}
