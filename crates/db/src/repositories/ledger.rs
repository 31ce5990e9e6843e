//! Ledger repository: the append-only movement log and barcode custody.
//!
//! Every operation takes the tenant context and filters by its company.
//! The `*_with` variants run on the caller's transaction, so movement
//! producers can append several units atomically.
//!
//! Writes enforce the ledger rules themselves:
//! - an outbound entry needs the barcode's custody at its branch
//! - nothing dated before the newest snapshot period may change
//! - a line can only be removed while it is the barcode's latest movement

use chrono::{NaiveDate, SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
};
use stockledger_core::ledger::{
    CustodyService, Direction, LedgerEntry, LedgerError, NewLedgerEntry, validate_barcode,
};
use stockledger_core::stock::StockPeriod;
use stockledger_shared::TenantContext;
use stockledger_shared::types::{
    BranchId, CompanyId, DocumentId, LedgerEntryId, ProductId, ShelfId,
};
use tracing::{debug, warn};

use super::error::InventoryError;
use super::snapshot;
use crate::entities::inventory_ledger;
use crate::locks;

/// Row filter for scans over a tenant's ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter {
    /// Restrict to one product.
    pub product_id: Option<ProductId>,
    /// Restrict to one branch.
    pub branch_id: Option<BranchId>,
    /// First transaction date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last transaction date (inclusive).
    pub to: Option<NaiveDate>,
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one movement in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::append_with`].
    pub async fn append(
        &self,
        ctx: &TenantContext,
        input: NewLedgerEntry,
    ) -> Result<LedgerEntry, InventoryError> {
        let txn = self.db.begin().await?;
        let entry = Self::append_with(&txn, ctx, input).await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Appends one movement on the caller's transaction.
    ///
    /// The company comes from `ctx`; id and creation time are stamped here.
    /// An outbound movement is checked with [`Self::verify_custody_with`]
    /// first, and may not be dated before the barcode's latest movement.
    ///
    /// # Errors
    ///
    /// - `Validation` errors for missing fields
    /// - `PeriodClosed` when the date falls in a closed period
    /// - custody errors for an outbound movement
    /// - database errors
    pub async fn append_with<C>(
        conn: &C,
        ctx: &TenantContext,
        input: NewLedgerEntry,
    ) -> Result<LedgerEntry, InventoryError>
    where
        C: ConnectionTrait,
    {
        let mut entry = input.into_entry(ctx.company_id, Utc::now())?;

        locks::share_closing(conn, ctx.company_id).await?;
        ensure_open(conn, ctx.company_id, entry.transaction_date).await?;

        if !entry.is_inbound() {
            let located =
                Self::verify_custody_with(conn, ctx, &entry.barcode, entry.branch_id).await?;
            if entry.transaction_date < located.transaction_date {
                return Err(LedgerError::InvalidField {
                    field: "transaction_date",
                    reason: format!(
                        "{} is before the latest movement of {} on {}",
                        entry.transaction_date, entry.barcode, located.transaction_date
                    ),
                }
                .into());
            }
        }

        // Stamped after the locks so same-day ties follow commit order. Stored
        // timestamps keep microseconds; the returned entry equals a later read.
        entry.created_at = Utc::now().trunc_subsecs(6);
        active_model(&entry).insert(conn).await?;

        debug!(
            company_id = %entry.company_id,
            barcode = %entry.barcode,
            transaction_code = %entry.transaction_code,
            inbound = entry.is_inbound(),
            "Appended ledger entry"
        );

        Ok(entry)
    }

    /// Returns the chronologically latest entry of a barcode.
    ///
    /// # Errors
    ///
    /// Returns `BarcodeNotFound` when the barcode has no history.
    pub async fn locate(
        &self,
        ctx: &TenantContext,
        barcode: &str,
    ) -> Result<LedgerEntry, InventoryError> {
        Self::locate_with(&self.db, ctx, barcode)
            .await?
            .ok_or_else(|| LedgerError::BarcodeNotFound(barcode.trim().to_string()).into())
    }

    /// Returns the latest entry of a barcode, or `None` without history.
    ///
    /// Ordered by transaction date, then creation time, then entry id.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error for a blank barcode, or a database error.
    pub async fn locate_with<C>(
        conn: &C,
        ctx: &TenantContext,
        barcode: &str,
    ) -> Result<Option<LedgerEntry>, InventoryError>
    where
        C: ConnectionTrait,
    {
        validate_barcode(barcode)?;

        let model = barcode_query(ctx.company_id, barcode.trim())
            .order_by_desc(inventory_ledger::Column::TransactionDate)
            .order_by_desc(inventory_ledger::Column::CreatedAt)
            .order_by_desc(inventory_ledger::Column::Id)
            .one(conn)
            .await?;

        model.map(to_entry).transpose()
    }

    /// Checks that `branch_id` currently holds the barcode.
    ///
    /// Outside a transaction the check is advisory only. Appending an
    /// outbound entry repeats it under the barcode lock.
    ///
    /// # Errors
    ///
    /// - `BarcodeNotFound` if the barcode has no history
    /// - `CustodyConflict` if another branch holds it
    /// - `NotInStock` if it already left stock
    pub async fn verify_custody(
        &self,
        ctx: &TenantContext,
        barcode: &str,
        branch_id: BranchId,
    ) -> Result<LedgerEntry, InventoryError> {
        Self::verify_custody_with(&self.db, ctx, barcode, branch_id).await
    }

    /// Checks custody on the caller's transaction, locking the barcode first.
    ///
    /// Returns the located entry on success.
    ///
    /// # Errors
    ///
    /// See [`Self::verify_custody`].
    pub async fn verify_custody_with<C>(
        conn: &C,
        ctx: &TenantContext,
        barcode: &str,
        branch_id: BranchId,
    ) -> Result<LedgerEntry, InventoryError>
    where
        C: ConnectionTrait,
    {
        validate_barcode(barcode)?;
        let barcode = barcode.trim();

        locks::lock_custody(conn, ctx.company_id, barcode).await?;
        let located = Self::locate_with(conn, ctx, barcode).await?;

        if let Err(err) = CustodyService::verify(located.as_ref(), barcode, branch_id) {
            warn!(
                company_id = %ctx.company_id,
                barcode = %barcode,
                branch_id = %branch_id,
                error = %err,
                "Custody check rejected"
            );
            return Err(err.into());
        }

        located.ok_or_else(|| LedgerError::BarcodeNotFound(barcode.to_string()).into())
    }

    /// Deletes the entry owned by a document line in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::remove_with`].
    pub async fn remove(
        &self,
        ctx: &TenantContext,
        transaction_id: DocumentId,
        barcode: &str,
    ) -> Result<(), InventoryError> {
        let txn = self.db.begin().await?;
        Self::remove_with(&txn, ctx, transaction_id, barcode).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Deletes the entry owned by a document line on the caller's transaction.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` when no entry matches
    /// - `PeriodClosed` when the entry is dated in a closed period
    /// - `LaterMovementExists` when the barcode moved again after this entry
    pub async fn remove_with<C>(
        conn: &C,
        ctx: &TenantContext,
        transaction_id: DocumentId,
        barcode: &str,
    ) -> Result<(), InventoryError>
    where
        C: ConnectionTrait,
    {
        validate_barcode(barcode)?;
        let barcode = barcode.trim();

        locks::share_closing(conn, ctx.company_id).await?;
        locks::lock_custody(conn, ctx.company_id, barcode).await?;

        let entry = line_query(ctx.company_id, transaction_id, barcode)
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound {
                transaction_id,
                barcode: barcode.to_string(),
            })?;
        ensure_open(conn, ctx.company_id, entry.transaction_date).await?;

        let latest = Self::locate_with(conn, ctx, barcode).await?;
        if latest.is_some_and(|l| l.id.into_inner() != entry.id) {
            return Err(LedgerError::LaterMovementExists {
                transaction_id,
                barcode: barcode.to_string(),
            }
            .into());
        }

        inventory_ledger::Entity::delete_many()
            .filter(inventory_ledger::Column::CompanyId.eq(ctx.company_id.into_inner()))
            .filter(inventory_ledger::Column::Id.eq(entry.id))
            .exec(conn)
            .await?;

        debug!(
            company_id = %ctx.company_id,
            transaction_id = %transaction_id,
            barcode = %barcode,
            "Removed ledger entry"
        );
        Ok(())
    }

    /// Returns the entry owned by a document line.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when no entry matches.
    pub async fn find(
        &self,
        ctx: &TenantContext,
        transaction_id: DocumentId,
        barcode: &str,
    ) -> Result<LedgerEntry, InventoryError> {
        validate_barcode(barcode)?;
        let barcode = barcode.trim();

        let model = line_query(ctx.company_id, transaction_id, barcode)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound {
                transaction_id,
                barcode: barcode.to_string(),
            })?;

        to_entry(model)
    }

    /// Returns a barcode's full chain, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error for a blank barcode, or a database error.
    pub async fn history(
        &self,
        ctx: &TenantContext,
        barcode: &str,
    ) -> Result<Vec<LedgerEntry>, InventoryError> {
        validate_barcode(barcode)?;

        let models = barcode_query(ctx.company_id, barcode.trim())
            .all(&self.db)
            .await?;
        let entries = models
            .into_iter()
            .map(to_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CustodyService::chain(entries))
    }
}

/// Loads a tenant's entries matching `filter`.
pub(crate) async fn load_entries<C>(
    conn: &C,
    company_id: CompanyId,
    filter: EntryFilter,
) -> Result<Vec<LedgerEntry>, InventoryError>
where
    C: ConnectionTrait,
{
    let mut query = inventory_ledger::Entity::find()
        .filter(inventory_ledger::Column::CompanyId.eq(company_id.into_inner()));

    if let Some(product_id) = filter.product_id {
        query = query.filter(inventory_ledger::Column::ProductId.eq(product_id.into_inner()));
    }
    query = match filter.branch_id {
        Some(branch_id) => {
            query.filter(inventory_ledger::Column::BranchId.eq(branch_id.into_inner()))
        }
        None => query,
    };
    if let Some(from) = filter.from {
        query = query.filter(inventory_ledger::Column::TransactionDate.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(inventory_ledger::Column::TransactionDate.lte(to));
    }

    query
        .all(conn)
        .await?
        .into_iter()
        .map(to_entry)
        .collect()
}

/// Rejects changes dated before the newest snapshot period.
///
/// Stock is read from that snapshot forward, so an earlier movement would
/// never be counted.
async fn ensure_open<C>(
    conn: &C,
    company_id: CompanyId,
    date: NaiveDate,
) -> Result<(), InventoryError>
where
    C: ConnectionTrait,
{
    match snapshot::latest_period(conn, company_id, None).await? {
        Some(latest) if date < latest.first_day() => {
            Err(LedgerError::PeriodClosed(StockPeriod::of(date)).into())
        }
        _ => Ok(()),
    }
}

fn barcode_query(company_id: CompanyId, barcode: &str) -> Select<inventory_ledger::Entity> {
    inventory_ledger::Entity::find()
        .filter(inventory_ledger::Column::CompanyId.eq(company_id.into_inner()))
        .filter(inventory_ledger::Column::Barcode.eq(barcode))
}

fn line_query(
    company_id: CompanyId,
    transaction_id: DocumentId,
    barcode: &str,
) -> Select<inventory_ledger::Entity> {
    barcode_query(company_id, barcode)
        .filter(inventory_ledger::Column::TransactionId.eq(transaction_id.into_inner()))
}

pub(crate) fn active_model(entry: &LedgerEntry) -> inventory_ledger::ActiveModel {
    inventory_ledger::ActiveModel {
        id: Set(entry.id.into_inner()),
        company_id: Set(entry.company_id.into_inner()),
        branch_id: Set(entry.branch_id.into_inner()),
        shelf_id: Set(entry.shelf_id.into_inner()),
        product_id: Set(entry.product_id.into_inner()),
        barcode: Set(entry.barcode.clone()),
        transaction_id: Set(entry.transaction_id.into_inner()),
        transaction_code: Set(entry.transaction_code.clone()),
        transaction_type: Set(entry.transaction_type.code().to_string()),
        transaction_date: Set(entry.transaction_date),
        is_in: Set(entry.is_inbound()),
        created_at: Set(entry.created_at.into()),
    }
}

fn to_entry(model: inventory_ledger::Model) -> Result<LedgerEntry, InventoryError> {
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        branch_id: BranchId::from_uuid(model.branch_id),
        shelf_id: ShelfId::from_uuid(model.shelf_id),
        product_id: ProductId::from_uuid(model.product_id),
        barcode: model.barcode,
        transaction_id: DocumentId::from_uuid(model.transaction_id),
        transaction_code: model.transaction_code,
        transaction_type: model.transaction_type.parse()?,
        transaction_date: model.transaction_date,
        direction: Direction::from_is_in(model.is_in),
        created_at: model.created_at.with_timezone(&Utc),
    })
}
