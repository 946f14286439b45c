use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::money;

/// Snapshot of a pending order taken at confirmation. Rows are only ever
/// inserted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "confirmed_order")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub order_id: String,
  pub pharmacy_name: String,
  pub rep_name: String,
  #[serde(with = "money")]
  pub total_value: i64,
  pub order_date: Date,
  pub confirmed_date: DateTime,
  pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
