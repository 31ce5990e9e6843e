//! `SeaORM` Entity for the stock_snapshot_details table.
//!
//! Each row is one unit on hand at a branch at the start of the period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_snapshot_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub snapshot_id: Uuid,
    pub branch_id: Uuid,
    pub shelf_id: Uuid,
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_snapshots::Entity",
        from = "Column::SnapshotId",
        to = "super::stock_snapshots::Column::Id",
        on_delete = "Cascade"
    )]
    StockSnapshots,
}

impl Related<super::stock_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
