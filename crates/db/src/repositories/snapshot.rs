//! Snapshot row access shared by the ledger, stock and closing repositories.
//!
//! Which periods are closed is read from `stock_closings`; the units of a
//! period live in the snapshot header and detail tables.

use std::collections::HashMap;

use chrono::{SubsecRound, Utc};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use stockledger_core::ledger::LedgerError;
use stockledger_core::stock::{ClosingService, SnapshotLine, StockPeriod};
use stockledger_shared::types::{
    BranchId, CompanyId, ProductId, ShelfId, SnapshotDetailId, SnapshotId,
};
use uuid::Uuid;

use super::error::InventoryError;
use crate::entities::{stock_closings, stock_snapshot_details, stock_snapshots};

// Keeps bound parameters per statement well under backend limits.
const CHUNK: usize = 500;

/// Returns the newest snapshot period of a tenant, optionally not after `until`.
pub(crate) async fn latest_period<C>(
    conn: &C,
    company_id: CompanyId,
    until: Option<StockPeriod>,
) -> Result<Option<StockPeriod>, InventoryError>
where
    C: ConnectionTrait,
{
    let mut query = stock_closings::Entity::find()
        .filter(stock_closings::Column::CompanyId.eq(company_id.into_inner()));

    if let Some(until) = until {
        let month = month_column(until)?;
        query = query.filter(
            Condition::any()
                .add(stock_closings::Column::Year.lt(until.year()))
                .add(
                    Condition::all()
                        .add(stock_closings::Column::Year.eq(until.year()))
                        .add(stock_closings::Column::Month.lte(month)),
                ),
        );
    }

    let latest = query
        .order_by_desc(stock_closings::Column::Year)
        .order_by_desc(stock_closings::Column::Month)
        .one(conn)
        .await?;

    latest.map(|s| period_of(s.year, s.month)).transpose()
}

/// Returns true if closing has written the period, even with no units.
pub(crate) async fn period_exists<C>(
    conn: &C,
    company_id: CompanyId,
    period: StockPeriod,
) -> Result<bool, InventoryError>
where
    C: ConnectionTrait,
{
    let count = stock_closings::Entity::find()
        .filter(stock_closings::Column::CompanyId.eq(company_id.into_inner()))
        .filter(stock_closings::Column::Year.eq(period.year()))
        .filter(stock_closings::Column::Month.eq(month_column(period)?))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Loads the units stored for a period, sorted by product then barcode.
pub(crate) async fn load_lines<C>(
    conn: &C,
    company_id: CompanyId,
    period: StockPeriod,
    product_id: Option<ProductId>,
    branch_id: Option<BranchId>,
) -> Result<Vec<SnapshotLine>, InventoryError>
where
    C: ConnectionTrait,
{
    let mut headers = stock_snapshots::Entity::find()
        .filter(stock_snapshots::Column::CompanyId.eq(company_id.into_inner()))
        .filter(stock_snapshots::Column::Year.eq(period.year()))
        .filter(stock_snapshots::Column::Month.eq(month_column(period)?));
    if let Some(product_id) = product_id {
        headers = headers.filter(stock_snapshots::Column::ProductId.eq(product_id.into_inner()));
    }

    let products: HashMap<Uuid, ProductId> = headers
        .all(conn)
        .await?
        .into_iter()
        .map(|h| (h.id, ProductId::from_uuid(h.product_id)))
        .collect();
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = products.keys().copied().collect();
    let mut lines = Vec::new();
    for chunk in ids.chunks(CHUNK) {
        let query = stock_snapshot_details::Entity::find()
            .filter(stock_snapshot_details::Column::SnapshotId.is_in(chunk.iter().copied()));
        let query = match branch_id {
            Some(branch_id) => query
                .filter(stock_snapshot_details::Column::BranchId.eq(branch_id.into_inner())),
            None => query,
        };

        for detail in query.all(conn).await? {
            let Some(product_id) = products.get(&detail.snapshot_id) else {
                continue;
            };
            lines.push(SnapshotLine {
                product_id: *product_id,
                barcode: detail.code,
                branch_id: BranchId::from_uuid(detail.branch_id),
                shelf_id: ShelfId::from_uuid(detail.shelf_id),
            });
        }
    }

    lines.sort();
    Ok(lines)
}

/// Registers the period as closed and writes its units: one snapshot row
/// per product and one detail row per unit.
pub(crate) async fn insert_lines<C>(
    conn: &C,
    company_id: CompanyId,
    period: StockPeriod,
    lines: &[SnapshotLine],
) -> Result<(), InventoryError>
where
    C: ConnectionTrait,
{
    let month = month_column(period)?;
    let now = Utc::now().trunc_subsecs(6);

    stock_closings::Entity::insert(stock_closings::ActiveModel {
        id: Set(Uuid::now_v7()),
        company_id: Set(company_id.into_inner()),
        year: Set(period.year()),
        month: Set(month),
        units: Set(i64::try_from(lines.len()).unwrap_or(i64::MAX)),
        created_at: Set(now.into()),
    })
    .exec_without_returning(conn)
    .await?;

    for (product_id, units) in ClosingService::by_product(lines) {
        let snapshot_id = SnapshotId::new();
        stock_snapshots::Entity::insert(stock_snapshots::ActiveModel {
            id: Set(snapshot_id.into_inner()),
            company_id: Set(company_id.into_inner()),
            product_id: Set(product_id.into_inner()),
            year: Set(period.year()),
            month: Set(month),
            created_at: Set(now.into()),
        })
        .exec_without_returning(conn)
        .await?;

        for chunk in units.chunks(CHUNK) {
            let details = chunk.iter().map(|unit| stock_snapshot_details::ActiveModel {
                id: Set(SnapshotDetailId::new().into_inner()),
                snapshot_id: Set(snapshot_id.into_inner()),
                branch_id: Set(unit.branch_id.into_inner()),
                shelf_id: Set(unit.shelf_id.into_inner()),
                code: Set(unit.barcode.clone()),
            });
            stock_snapshot_details::Entity::insert_many(details)
                .exec_without_returning(conn)
                .await?;
        }
    }

    Ok(())
}

fn month_column(period: StockPeriod) -> Result<i32, InventoryError> {
    i32::try_from(period.month()).map_err(|_| {
        LedgerError::InvalidPeriod {
            year: period.year(),
            month: period.month(),
        }
        .into()
    })
}

fn period_of(year: i32, month: i32) -> Result<StockPeriod, InventoryError> {
    let month = u32::try_from(month).map_err(|_| LedgerError::InvalidPeriod { year, month: 0 })?;
    Ok(StockPeriod::new(year, month)?)
}
