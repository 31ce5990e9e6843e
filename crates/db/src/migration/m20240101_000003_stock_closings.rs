//! Stock closing register migration.
//!
//! Snapshot headers exist only for products with units on hand, so an empty
//! closing leaves no header behind. This table records every closed period
//! and is what the ledger checks before accepting a dated movement.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(STOCK_CLOSINGS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS stock_closings CASCADE;")
            .await?;
        Ok(())
    }
}

const STOCK_CLOSINGS_SQL: &str = r"
CREATE TABLE stock_closings (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    units BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_stock_closings_period UNIQUE (company_id, year, month),
    CONSTRAINT chk_stock_closings_month CHECK (month BETWEEN 1 AND 12),
    CONSTRAINT chk_stock_closings_units CHECK (units >= 0)
);

-- Existing snapshots count as closed periods
INSERT INTO stock_closings (id, company_id, year, month, units, created_at)
SELECT gen_random_uuid(), s.company_id, s.year, s.month, COUNT(d.id), MIN(s.created_at)
FROM stock_snapshots s
LEFT JOIN stock_snapshot_details d ON d.snapshot_id = s.id
GROUP BY s.company_id, s.year, s.month;
";
