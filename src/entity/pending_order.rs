use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{order_detail, user};
use crate::utils::money;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "confirmed")]
  Confirmed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub order_id: String,
  pub pharmacy_name: String,
  pub rep_name: String,
  #[serde(with = "money")]
  pub total_value: i64,
  pub order_date: Date,
  pub user_id: i32,
  pub status: OrderStatus,
  /// Set when creation decremented product stock, so cancellation knows
  /// whether there is anything to give back.
  pub stock_reserved: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id"
  )]
  User,
  #[sea_orm(has_many = "order_detail::Entity")]
  Details,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<order_detail::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Details.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
