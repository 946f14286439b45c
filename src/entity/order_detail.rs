use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::pending_order;
use crate::utils::money;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_details")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub detail_id: i32,
  pub order_id: String,
  pub product_name: String,
  #[serde(with = "money")]
  pub unit_price: i64,
  pub quantity: i32,
  #[serde(with = "money")]
  pub total_price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "pending_order::Entity",
    from = "Column::OrderId",
    to = "pending_order::Column::OrderId"
  )]
  Order,
}

impl Related<pending_order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Order.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
