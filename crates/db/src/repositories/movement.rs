//! Movement repository: posting receipts, deliveries and returns.
//!
//! A document is posted in one transaction, so a rejected line leaves
//! nothing behind. The barcodes of an outbound document are locked in sorted
//! order up front; two documents sharing units then queue instead of
//! deadlocking.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use stockledger_core::ledger::{LedgerEntry, TransactionType};
use stockledger_core::movement::{MovementDocument, MovementService, document_code};
use stockledger_core::stock::StockPeriod;
use stockledger_shared::TenantContext;
use stockledger_shared::types::DocumentId;
use tracing::info;
use uuid::Uuid;

use super::error::InventoryError;
use super::ledger::LedgerRepository;
use crate::entities::inventory_ledger;
use crate::locks;

/// Movement repository.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a document: one ledger entry per line, all or nothing.
    ///
    /// # Errors
    ///
    /// - `Validation` errors from the document or its lines
    /// - `PeriodClosed` when the document date falls in a closed period
    /// - custody errors for any outbound line
    /// - database errors
    pub async fn post(
        &self,
        ctx: &TenantContext,
        document: &MovementDocument,
    ) -> Result<Vec<LedgerEntry>, InventoryError> {
        let inputs = MovementService::entries(document)?;

        let txn = self.db.begin().await?;

        if !document.direction().is_inbound() {
            locks::share_closing(&txn, ctx.company_id).await?;
            let mut barcodes: Vec<&str> = inputs.iter().map(|i| i.barcode.trim()).collect();
            barcodes.sort_unstable();
            barcodes.dedup();
            for barcode in barcodes {
                locks::lock_custody(&txn, ctx.company_id, barcode).await?;
            }
        }

        let mut entries = Vec::with_capacity(inputs.len());
        for input in inputs {
            entries.push(LedgerRepository::append_with(&txn, ctx, input).await?);
        }

        txn.commit().await?;

        info!(
            company_id = %ctx.company_id,
            transaction_code = %document.code,
            transaction_type = %document.transaction_type,
            units = entries.len(),
            "Posted movement document"
        );
        Ok(entries)
    }

    /// Removes the entry of one deleted document line.
    ///
    /// # Errors
    ///
    /// See [`LedgerRepository::remove_with`].
    pub async fn remove_line(
        &self,
        ctx: &TenantContext,
        transaction_id: DocumentId,
        barcode: &str,
    ) -> Result<(), InventoryError> {
        let txn = self.db.begin().await?;
        LedgerRepository::remove_with(&txn, ctx, transaction_id, barcode).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Returns the code for the next document of a kind in `date`'s month.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn next_document_code(
        &self,
        ctx: &TenantContext,
        transaction_type: TransactionType,
        date: NaiveDate,
    ) -> Result<String, InventoryError> {
        let posted = count_documents(&self.db, ctx, transaction_type, date).await?;
        Ok(document_code(transaction_type, date, posted + 1))
    }
}

async fn count_documents<C>(
    conn: &C,
    ctx: &TenantContext,
    transaction_type: TransactionType,
    date: NaiveDate,
) -> Result<u64, InventoryError>
where
    C: ConnectionTrait,
{
    let month = StockPeriod::of(date);
    let ids: Vec<Uuid> = inventory_ledger::Entity::find()
        .select_only()
        .column(inventory_ledger::Column::TransactionId)
        .distinct()
        .filter(inventory_ledger::Column::CompanyId.eq(ctx.company_id.into_inner()))
        .filter(inventory_ledger::Column::TransactionType.eq(transaction_type.code()))
        .filter(inventory_ledger::Column::TransactionDate.gte(month.first_day()))
        .filter(inventory_ledger::Column::TransactionDate.lte(month.last_day()))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(u64::try_from(ids.len()).unwrap_or(u64::MAX))
}
