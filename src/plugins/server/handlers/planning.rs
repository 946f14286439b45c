use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Datelike;
use serde::Deserialize;

use super::{Message, Payload};
use crate::{
  entity::{rep_achievement, route_plan},
  plugins::server::auth::AuthUser,
  prelude::*,
  state::AppState,
  sv::{
    achievement::{self, AchievementFilter, TargetUpdate},
    report::{MonthlySales, ProductSales, RepPerformance, Summary},
    route::Stop,
  },
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
  pub rep_id: Option<i32>,
  pub date: Option<Date>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReq {
  #[serde(default)]
  pub rep_id: Option<i32>,
  pub visit_date: Date,
  #[serde(default)]
  pub stops: Vec<Stop>,
}

#[derive(Deserialize)]
pub struct YearQuery {
  pub year: Option<i32>,
  pub month: Option<String>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
  pub limit: Option<usize>,
}

fn current_year() -> i32 {
  Utc::now().year()
}

/// Reps only ever act on their own rows.
fn target_rep(auth: &AuthUser, requested: Option<i32>) -> Result<i32> {
  match requested {
    Some(rep_id) if rep_id != auth.id => {
      auth.require_admin()?;
      Ok(rep_id)
    }
    _ => Ok(auth.id),
  }
}

pub async fn achievements(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Query(mut filter): Query<AchievementFilter>,
) -> Result<Json<Vec<rep_achievement::Model>>> {
  if !auth.is_admin() {
    filter.rep_id = Some(auth.id);
  }
  Ok(Json(app.sv().achievement.list(&filter).await?))
}

/// A single rep period, `null` until the rep has a target or a sale in it.
pub async fn achievement(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path((rep_id, year, month)): Path<(i32, i32, String)>,
) -> Result<Json<Option<rep_achievement::Model>>> {
  let rep_id = target_rep(&auth, Some(rep_id))?;
  let month = achievement::month_name(&month)
    .ok_or_else(|| Error::InvalidArgs(format!("Unknown month '{month}'")))?;
  Ok(Json(app.sv().achievement.get(rep_id, month, year).await?))
}

pub async fn set_target(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Payload(update): Payload<TargetUpdate>,
) -> Result<Json<rep_achievement::Model>> {
  auth.require_admin()?;
  Ok(Json(app.sv().achievement.set_target(update).await?))
}

pub async fn list_routes(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Query(query): Query<RouteQuery>,
) -> Result<Json<Vec<route_plan::Model>>> {
  let rep_id = target_rep(&auth, query.rep_id)?;
  Ok(Json(app.sv().route.for_rep(rep_id, query.date).await?))
}

pub async fn plan_route(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Payload(req): Payload<RouteReq>,
) -> Result<Json<Vec<route_plan::Model>>> {
  let rep_id = target_rep(&auth, req.rep_id)?;
  Ok(Json(app.sv().route.plan(rep_id, req.visit_date, req.stops).await?))
}

async fn own_stop(
  app: &AppState,
  auth: &AuthUser,
  id: i32,
) -> Result<route_plan::Model> {
  let stop = app.sv().route.get(id).await?;
  target_rep(auth, Some(stop.rep_id))?;
  Ok(stop)
}

pub async fn mark_visited(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(id): Path<i32>,
) -> Result<Json<route_plan::Model>> {
  own_stop(&app, &auth, id).await?;
  Ok(Json(app.sv().route.mark_visited(id).await?))
}

pub async fn delete_stop(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(id): Path<i32>,
) -> Result<Json<Message>> {
  own_stop(&app, &auth, id).await?;
  app.sv().route.delete(id).await?;
  Ok(Message::new("Route stop deleted"))
}

pub async fn monthly_sales(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MonthlySales>>> {
  let year = query.year.unwrap_or_else(current_year);
  Ok(Json(app.sv().report.monthly_sales(year).await?))
}

pub async fn rep_performance(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Query(query): Query<YearQuery>,
) -> Result<Json<Vec<RepPerformance>>> {
  let year = query.year.unwrap_or_else(current_year);
  let month = match &query.month {
    Some(raw) => Some(achievement::month_name(raw).ok_or_else(|| {
      Error::InvalidArgs(format!("Unknown month '{raw}'"))
    })?),
    None => None,
  };
  Ok(Json(app.sv().report.rep_performance(year, month).await?))
}

pub async fn top_products(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
  Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ProductSales>>> {
  let limit = query.limit.unwrap_or(10).clamp(1, 100);
  Ok(Json(app.sv().report.top_products(limit).await?))
}

pub async fn summary(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
) -> Result<Json<Summary>> {
  let threshold = app.config.low_stock_threshold;
  Ok(Json(app.sv().report.summary(threshold).await?))
}
