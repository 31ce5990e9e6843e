//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_inventory_ledger;
mod m20240101_000002_stock_snapshots;
mod m20240101_000003_stock_closings;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_inventory_ledger::Migration),
            Box::new(m20240101_000002_stock_snapshots::Migration),
            Box::new(m20240101_000003_stock_closings::Migration),
        ]
    }
}
