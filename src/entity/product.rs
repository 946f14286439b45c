use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::money;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub product_id: i32,
  #[sea_orm(unique)]
  pub name: String,
  pub batch_number: String,
  pub expiry_date: Date,
  /// Not floored at zero: reserved orders may drive it negative.
  pub quantity: i32,
  /// Cents.
  #[serde(with = "money")]
  pub unit_price: i64,
  pub supplier_info: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
