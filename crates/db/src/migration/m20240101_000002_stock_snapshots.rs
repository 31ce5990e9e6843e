//! Stock snapshot migration.
//!
//! Snapshots are written only by period closing and never updated.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(STOCK_SNAPSHOTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS stock_snapshot_details CASCADE;
             DROP TABLE IF EXISTS stock_snapshots CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const STOCK_SNAPSHOTS_SQL: &str = r"
CREATE TABLE stock_snapshots (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    product_id UUID NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_stock_snapshots_period UNIQUE (company_id, product_id, year, month),
    CONSTRAINT chk_stock_snapshots_month CHECK (month BETWEEN 1 AND 12)
);

CREATE INDEX idx_stock_snapshots_company_period
    ON stock_snapshots(company_id, year DESC, month DESC);

-- One row per unit on hand; the code is the unit's barcode
CREATE TABLE stock_snapshot_details (
    id UUID PRIMARY KEY,
    snapshot_id UUID NOT NULL REFERENCES stock_snapshots(id) ON DELETE CASCADE,
    branch_id UUID NOT NULL,
    shelf_id UUID NOT NULL,
    code VARCHAR(100) NOT NULL,
    CONSTRAINT uq_stock_snapshot_details_code UNIQUE (code, snapshot_id)
);

CREATE INDEX idx_stock_snapshot_details_branch
    ON stock_snapshot_details(snapshot_id, branch_id);
";
