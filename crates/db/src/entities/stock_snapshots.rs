//! `SeaORM` Entity for the stock_snapshots table.
//!
//! One row per (company, product, period) that had units on hand.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_snapshot_details::Entity")]
    StockSnapshotDetails,
}

impl Related<super::stock_snapshot_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockSnapshotDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
