use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;

/// One stop of a rep's visiting plan for a day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "route_plans")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub rep_id: i32,
  pub visit_date: Date,
  pub sequence: i32,
  pub pharmacy_name: String,
  pub notes: Option<String>,
  pub visited: bool,
  pub created_at: DateTime,
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
