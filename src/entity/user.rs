use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{pending_order, rep_achievement, route_plan};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  #[sea_orm(string_value = "admin")]
  Admin,
  #[sea_orm(string_value = "rep")]
  #[default]
  Rep,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub username: String,
  pub full_name: String,
  pub email: Option<String>,
  pub role: UserRole,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "pending_order::Entity")]
  PendingOrders,
  #[sea_orm(has_many = "rep_achievement::Entity")]
  Achievements,
  #[sea_orm(has_many = "route_plan::Entity")]
  RoutePlans,
}

impl Related<pending_order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PendingOrders.def()
  }
}

impl Related<rep_achievement::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Achievements.def()
  }
}

impl Related<route_plan::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::RoutePlans.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
