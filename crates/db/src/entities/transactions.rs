//! `SeaORM` Entity for transactions table.
//!
//! `item` and `username` are copied text, not foreign keys, so history stays
//! intact when an item is deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item: String,
    pub quantity: i64,
    pub total: Decimal,
    pub cost: Decimal,
    pub username: String,
    /// `SALE` or `RETURN`.
    pub action: String,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
