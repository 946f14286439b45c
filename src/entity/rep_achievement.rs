use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;
use crate::utils::money;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rep_achievements")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub rep_id: i32,
  /// Long English month name, e.g. `March`.
  #[sea_orm(primary_key, auto_increment = false)]
  pub month: String,
  #[sea_orm(primary_key, auto_increment = false)]
  pub year: i32,
  #[serde(with = "money")]
  pub target: i64,
  #[serde(with = "money")]
  pub total_sales: i64,
  pub percentage: f64,
  pub last_updated: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::RepId",
    to = "user::Column::Id"
  )]
  Rep,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Rep.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
