//! `SeaORM` entity definitions.

pub mod inventory_ledger;
pub mod stock_closings;
pub mod stock_snapshot_details;
pub mod stock_snapshots;

pub mod prelude {
    //! Entity re-exports.

    pub use super::inventory_ledger::Entity as InventoryLedger;
    pub use super::stock_closings::Entity as StockClosings;
    pub use super::stock_snapshot_details::Entity as StockSnapshotDetails;
    pub use super::stock_snapshots::Entity as StockSnapshots;
}
