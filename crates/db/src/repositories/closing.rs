//! Closing repository: materializes period snapshots.
//!
//! Closing period P runs in one transaction per company:
//! 1. Lock closing for the company
//! 2. Pick the base snapshot and ledger window (see [`ClosingPlan`])
//! 3. Fold them into the units still on hand at the end of P
//! 4. Store the result as the snapshot of P + 1
//!
//! Every closing is registered, even one with no units, so the ledger
//! refuses later writes dated before the new snapshot period. A second run
//! for the same period recomputes the result and succeeds without writing
//! when it matches the stored snapshot; a mismatch is rejected.
//!
//! Periods that have not started yet cannot be closed.

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use stockledger_core::ledger::LedgerError;
use stockledger_core::stock::{
    ClosingPlan, ClosingService, ClosingSummary, SnapshotLine, StockPeriod,
};
use stockledger_shared::TenantContext;
use stockledger_shared::types::ProductId;
use tracing::{info, warn};

use super::error::InventoryError;
use super::ledger::{EntryFilter, load_entries};
use super::snapshot;
use crate::locks;

/// Closing repository.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    db: DatabaseConnection,
}

impl ClosingRepository {
    /// Creates a new closing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Closes a period, defaulting a missing year or month to today's.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` for an impossible year/month
    /// - `InvalidField` for a period starting after today
    /// - `PeriodAlreadyClosed` if the stored snapshot no longer matches
    /// - database errors, after which nothing has been written
    pub async fn close_period(
        &self,
        ctx: &TenantContext,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<ClosingSummary, InventoryError> {
        self.close_period_on(ctx, year, month, Utc::now().date_naive())
            .await
    }

    /// Same as [`Self::close_period`] with an explicit "today".
    ///
    /// # Errors
    ///
    /// See [`Self::close_period`].
    pub async fn close_period_on(
        &self,
        ctx: &TenantContext,
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<ClosingSummary, InventoryError> {
        let target = StockPeriod::resolve(year, month, today)?;
        self.close_on(ctx, target, today).await
    }

    /// Closes `target`, writing the snapshot of the following period.
    ///
    /// # Errors
    ///
    /// See [`Self::close_period`].
    pub async fn close(
        &self,
        ctx: &TenantContext,
        target: StockPeriod,
    ) -> Result<ClosingSummary, InventoryError> {
        self.close_on(ctx, target, Utc::now().date_naive()).await
    }

    /// Same as [`Self::close`] with an explicit "today".
    ///
    /// # Errors
    ///
    /// See [`Self::close_period`].
    pub async fn close_on(
        &self,
        ctx: &TenantContext,
        target: StockPeriod,
        today: NaiveDate,
    ) -> Result<ClosingSummary, InventoryError> {
        if target.first_day() > today {
            return Err(LedgerError::InvalidField {
                field: "period",
                reason: format!("{target} has not started"),
            }
            .into());
        }

        let company_id = ctx.company_id;
        let txn = self.db.begin().await?;
        locks::lock_closing(&txn, company_id).await?;

        let latest = snapshot::latest_period(&txn, company_id, Some(target)).await?;
        let plan = ClosingPlan::new(target, latest);

        let base = match plan.base {
            Some(period) => snapshot::load_lines(&txn, company_id, period, None, None).await?,
            None => Vec::new(),
        };
        let filter = EntryFilter {
            product_id: None,
            branch_id: None,
            from: plan.scan_from,
            to: Some(plan.scan_to),
        };
        let entries = load_entries(&txn, company_id, filter).await?;
        let lines = ClosingService::carry_forward(&base, &entries);

        let next = plan.snapshot_period();
        if snapshot::period_exists(&txn, company_id, next).await? {
            let stored = snapshot::load_lines(&txn, company_id, next, None, None).await?;
            if !ClosingService::same_details(&stored, &lines) {
                warn!(
                    company_id = %company_id,
                    period = %target,
                    stored_units = stored.len(),
                    computed_units = lines.len(),
                    "Closed period changed since its snapshot was taken"
                );
                txn.rollback().await?;
                return Err(LedgerError::PeriodAlreadyClosed(target).into());
            }

            txn.commit().await?;
            let summary = ClosingSummary::from_lines(company_id, target, &lines, true);
            info!(
                company_id = %company_id,
                period = %target,
                units = summary.units,
                "Period already closed with the same result"
            );
            return Ok(summary);
        }

        snapshot::insert_lines(&txn, company_id, next, &lines).await?;
        txn.commit().await?;

        let summary = ClosingSummary::from_lines(company_id, target, &lines, false);
        info!(
            company_id = %company_id,
            period = %target,
            snapshot_period = %next,
            base_period = ?plan.base,
            scanned_entries = entries.len(),
            products = summary.products,
            units = summary.units,
            "Closed stock period"
        );
        Ok(summary)
    }

    /// Lists the stored units of a period, optionally for one product.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotNotFound` when closing never produced the period.
    pub async fn snapshot_details(
        &self,
        ctx: &TenantContext,
        period: StockPeriod,
        product_id: Option<ProductId>,
    ) -> Result<Vec<SnapshotLine>, InventoryError> {
        if !snapshot::period_exists(&self.db, ctx.company_id, period).await? {
            return Err(LedgerError::SnapshotNotFound(period).into());
        }
        snapshot::load_lines(&self.db, ctx.company_id, period, product_id, None).await
    }

    /// Returns the newest snapshot period of the tenant.
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
