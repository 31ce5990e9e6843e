//! Stock repository: current on-hand quantities.
//!
//! Reads the newest snapshot not after today and folds in the ledger entries
//! dated from that snapshot's first day. Without a snapshot the whole history
//! is scanned.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;
use stockledger_core::stock::{StockPeriod, StockService};
use stockledger_shared::TenantContext;
use stockledger_shared::types::{BranchId, ProductId};
use tracing::debug;

use super::error::InventoryError;
use super::ledger::{EntryFilter, load_entries};
use super::snapshot;

/// On-hand quantity of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductStock {
    /// Product id.
    pub product_id: ProductId,
    /// Units on hand.
    pub quantity: u64,
}

/// Stock repository.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the units of a product on hand now, company-wide or at one branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current_stock(
        &self,
        ctx: &TenantContext,
        product_id: ProductId,
        branch_id: Option<BranchId>,
    ) -> Result<u64, InventoryError> {
        Self::current_stock_with(&self.db, ctx, product_id, branch_id).await
    }

    /// Same as [`Self::current_stock`] on the caller's connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current_stock_with<C>(
        conn: &C,
        ctx: &TenantContext,
        product_id: ProductId,
        branch_id: Option<BranchId>,
    ) -> Result<u64, InventoryError>
    where
        C: ConnectionTrait,
    {
        let base = base_period(conn, ctx).await?;

        let lines = match base {
            Some(period) => {
                snapshot::load_lines(conn, ctx.company_id, period, Some(product_id), branch_id)
                    .await?
            }
            None => Vec::new(),
        };
        let filter = EntryFilter {
            product_id: Some(product_id),
            branch_id,
            from: base.map(|p| p.first_day()),
            to: None,
        };
        let entries = load_entries(conn, ctx.company_id, filter).await?;

        let quantity = StockService::count_on_hand(&lines, &entries);
        debug!(
            company_id = %ctx.company_id,
            product_id = %product_id,
            base_period = ?base,
            snapshot_units = lines.len(),
            scanned_entries = entries.len(),
            quantity,
            "Computed current stock"
        );
        Ok(quantity)
    }

    /// Lists on-hand quantities per product, sorted by product id.
    ///
    /// Products without stock are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_stock(
        &self,
        ctx: &TenantContext,
        branch_id: Option<BranchId>,
    ) -> Result<Vec<ProductStock>, InventoryError> {
        let base = base_period(&self.db, ctx).await?;

        let lines = match base {
            Some(period) => {
                snapshot::load_lines(&self.db, ctx.company_id, period, None, branch_id).await?
            }
            None => Vec::new(),
        };
        let filter = EntryFilter {
            product_id: None,
            branch_id,
            from: base.map(|p| p.first_day()),
            to: None,
        };
        let entries = load_entries(&self.db, ctx.company_id, filter).await?;

        Ok(StockService::on_hand_by_product(&lines, &entries)
            .into_iter()
            .map(|(product_id, quantity)| ProductStock {
                product_id,
                quantity,
            })
            .collect())
    }

    /// Returns the newest snapshot period of the tenant, if closing ever ran.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_snapshot_period(
        &self,
        ctx: &TenantContext,
    ) -> Result<Option<StockPeriod>, InventoryError> {
        snapshot::latest_period(&self.db, ctx.company_id, None).await
    }
}

async fn base_period<C>(
    conn: &C,
    ctx: &TenantContext,
) -> Result<Option<StockPeriod>, InventoryError>
where
    C: ConnectionTrait,
{
    let today = StockPeriod::of(Utc::now().date_naive());
    snapshot::latest_period(conn, ctx.company_id, Some(today)).await
}
