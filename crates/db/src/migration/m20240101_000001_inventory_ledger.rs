//! Inventory ledger migration.
//!
//! Creates the append-only movement log. A barcode's custodian is derived
//! from its newest row, so the barcode index is ordered the way `Locate`
//! reads it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INVENTORY_LEDGER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS inventory_ledger CASCADE;")
            .await?;
        Ok(())
    }
}

const INVENTORY_LEDGER_SQL: &str = r"
-- One row per unit movement
CREATE TABLE inventory_ledger (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    shelf_id UUID NOT NULL,
    product_id UUID NOT NULL,
    barcode VARCHAR(100) NOT NULL,
    transaction_id UUID NOT NULL,
    transaction_code VARCHAR(50) NOT NULL,
    transaction_type VARCHAR(2) NOT NULL,
    transaction_date DATE NOT NULL,
    is_in BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_ledger_barcode_not_blank CHECK (btrim(barcode) <> ''),
    CONSTRAINT chk_ledger_code_not_blank CHECK (btrim(transaction_code) <> ''),
    CONSTRAINT chk_ledger_transaction_type CHECK (transaction_type IN ('GR', 'DO', 'RR', 'DR'))
);

-- Locate: newest entry of a barcode within a tenant
CREATE INDEX idx_inventory_ledger_barcode
    ON inventory_ledger(company_id, barcode, transaction_date DESC, created_at DESC);

-- Stock aggregation and closing scans
CREATE INDEX idx_inventory_ledger_product
    ON inventory_ledger(company_id, product_id, transaction_date);

-- Line removal and document numbering
CREATE INDEX idx_inventory_ledger_transaction
    ON inventory_ledger(company_id, transaction_id, barcode);
CREATE INDEX idx_inventory_ledger_type_date
    ON inventory_ledger(company_id, transaction_type, transaction_date);
";
