use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;

use super::{Message, Payload};
use crate::{
  entity::{pharmacy, product},
  plugins::server::auth::AuthUser,
  prelude::*,
  state::AppState,
  sv::{
    pharmacy::NewPharmacy,
    product::{NewProduct, ProductPatch},
  },
};

#[derive(Deserialize)]
pub struct LowStockQuery {
  pub threshold: Option<i32>,
}

#[derive(Deserialize)]
pub struct ExpiringQuery {
  pub days: Option<u32>,
}

pub async fn list_products(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
) -> Result<Json<Vec<product::Model>>> {
  Ok(Json(app.sv().product.list().await?))
}

pub async fn get_product(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Path(id): Path<i32>,
) -> Result<Json<product::Model>> {
  Ok(Json(app.sv().product.get(id).await?))
}

pub async fn create_product(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Payload(new): Payload<NewProduct>,
) -> Result<Json<product::Model>> {
  auth.require_admin()?;
  Ok(Json(app.sv().product.create(new).await?))
}

pub async fn update_product(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(id): Path<i32>,
  Payload(patch): Payload<ProductPatch>,
) -> Result<Json<product::Model>> {
  auth.require_admin()?;
  Ok(Json(app.sv().product.update(id, patch).await?))
}

pub async fn delete_product(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(id): Path<i32>,
) -> Result<Json<Message>> {
  auth.require_admin()?;
  app.sv().product.delete(id).await?;
  Ok(Message::new("Product deleted"))
}

pub async fn low_stock(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Query(query): Query<LowStockQuery>,
) -> Result<Json<Vec<product::Model>>> {
  let threshold = query.threshold.unwrap_or(app.config.low_stock_threshold);
  Ok(Json(app.sv().product.low_stock(threshold).await?))
}

pub async fn expiring(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<product::Model>>> {
  let days = query.days.unwrap_or(app.config.expiry_window_days);
  Ok(Json(app.sv().product.expiring(days).await?))
}

pub async fn list_pharmacies(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
) -> Result<Json<Vec<pharmacy::Model>>> {
  Ok(Json(app.sv().pharmacy.list().await?))
}

pub async fn get_pharmacy(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Path(id): Path<i32>,
) -> Result<Json<pharmacy::Model>> {
  Ok(Json(app.sv().pharmacy.get(id).await?))
}

pub async fn create_pharmacy(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Payload(new): Payload<NewPharmacy>,
) -> Result<Json<pharmacy::Model>> {
  auth.require_admin()?;
  Ok(Json(app.sv().pharmacy.create(new).await?))
}
