//! `SeaORM` Entity for inventory table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item: String,
    pub category: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub low_stock_limit: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
