//! Shared helpers for repository tests.
//!
//! Tests run against an in-memory `SQLite` database whose schema is built
//! from the entities. The pool holds one connection so every query sees the
//! same database.

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use stockledger_core::ledger::{Direction, NewLedgerEntry, TransactionType};
use stockledger_shared::TenantContext;
use stockledger_shared::types::{BranchId, CompanyId, DocumentId, ProductId, ShelfId, UserId};

use crate::entities::{inventory_ledger, stock_closings, stock_snapshot_details, stock_snapshots};

/// Creates a fresh in-memory database with all tables.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(inventory_ledger::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(stock_snapshots::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(stock_snapshot_details::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(stock_closings::Entity)))
        .await
        .unwrap();

    db
}

/// A tenant context for a fresh company.
pub fn tenant() -> TenantContext {
    TenantContext::new(CompanyId::new(), UserId::new())
}

/// Builds a date, panicking on invalid input.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a ledger input with the document kind matching `direction`.
pub fn movement(
    product: ProductId,
    barcode: &str,
    branch: BranchId,
    direction: Direction,
    day: NaiveDate,
) -> NewLedgerEntry {
    let transaction_type = match direction {
        Direction::Inbound => TransactionType::GoodsReceipt,
        Direction::Outbound => TransactionType::DeliveryOrder,
    };
    NewLedgerEntry {
        branch_id: branch,
        shelf_id: ShelfId::from_uuid(branch.into_inner()),
        product_id: product,
        barcode: barcode.to_string(),
        transaction_id: DocumentId::new(),
        transaction_code: format!("{}2024011", transaction_type.code()),
        transaction_type,
        transaction_date: day,
        direction,
    }
}
