use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use super::{Message, Payload};
use crate::{
  entity::{confirmed_order, order_detail, pending_order},
  plugins::server::auth::AuthUser,
  prelude::*,
  state::AppState,
  sv::{
    notify::Mail,
    order::{LineItem, NewOrder, StockPolicy},
  },
  utils::money,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemReq {
  #[serde(default)]
  pub product_name: String,
  #[serde(with = "money")]
  pub unit_price: i64,
  pub quantity: i32,
  #[serde(default, with = "money::opt")]
  pub total_price: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReq {
  #[serde(default)]
  pub pharmacy_name: String,
  /// Admins may place orders on a rep's behalf.
  #[serde(default)]
  pub rep_id: Option<i32>,
  #[serde(default)]
  pub rep_name: Option<String>,
  #[serde(default)]
  pub order_date: Option<Date>,
  #[serde(default, with = "money::opt")]
  pub total_value: Option<i64>,
  #[serde(default)]
  pub items: Vec<OrderItemReq>,
}

#[derive(Serialize)]
pub struct PendingOrderView {
  #[serde(flatten)]
  pub order: pending_order::Model,
  pub items: Vec<order_detail::Model>,
}

async fn new_order(
  app: &AppState,
  auth: &AuthUser,
  req: OrderReq,
) -> Result<NewOrder> {
  let user_id = match req.rep_id {
    Some(rep_id) if rep_id != auth.id => {
      auth.require_admin()?;
      rep_id
    }
    _ => auth.id,
  };

  let mut new = NewOrder {
    pharmacy_name: req.pharmacy_name,
    rep_name: req.rep_name.unwrap_or_default(),
    user_id,
    order_date: req.order_date.unwrap_or_else(|| Utc::now().date_naive()),
    total_value: req.total_value,
    items: req
      .items
      .into_iter()
      .map(|item| LineItem {
        product_name: item.product_name,
        unit_price: item.unit_price,
        quantity: item.quantity,
        total_price: item.total_price,
      })
      .collect(),
  };
  // a malformed order is a 400 whatever rep it names
  new.validate_lines()?;

  if new.rep_name.trim().is_empty() {
    let rep =
      app.sv().user.by_id(user_id).await?.ok_or(Error::UserNotFound)?;
    new.rep_name = rep.full_name;
  }
  Ok(new)
}

/// Rep order: stock is taken as the order is recorded.
pub async fn confirm_order(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Payload(req): Payload<OrderReq>,
) -> Result<Json<Message>> {
  let new = new_order(&app, &auth, req).await?;
  let order = app.sv().order.place(new, StockPolicy::Reserve).await?;
  Ok(Message::order("Order placed successfully", order.order_id))
}

/// Cart checkout: stock is left alone.
pub async fn checkout(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Payload(req): Payload<OrderReq>,
) -> Result<Json<Message>> {
  let new = new_order(&app, &auth, req).await?;
  let order = app.sv().order.place(new, StockPolicy::Leave).await?;
  Ok(Message::order("Order placed successfully", order.order_id))
}

pub async fn pending_orders(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
) -> Result<Json<Vec<PendingOrderView>>> {
  let orders = app.sv().order.pending(auth.scope()).await?;
  Ok(Json(
    orders
      .into_iter()
      .map(|(order, items)| PendingOrderView { order, items })
      .collect(),
  ))
}

pub async fn pending_order(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(order_id): Path<String>,
) -> Result<Json<PendingOrderView>> {
  let sv = app.sv();

  let order = sv.order.get(&order_id).await?;
  if !auth.is_admin() && order.user_id != auth.id {
    return Err(Error::Forbidden);
  }

  let items = sv.order.details(&order_id).await?;
  Ok(Json(PendingOrderView { order, items }))
}

pub async fn cancel_order(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(order_id): Path<String>,
) -> Result<Json<Message>> {
  let sv = app.sv();

  let order = sv.order.get(&order_id).await?;
  if !auth.is_admin() && order.user_id != auth.id {
    return Err(Error::Forbidden);
  }

  sv.order.cancel(&order_id).await?;
  Ok(Message::new("Order deleted successfully"))
}

/// Mails the pharmacy and the rep. Runs after the commit, so failures here
/// never undo a confirmation.
async fn notify_confirmed(
  app: &AppState,
  confirmed: &confirmed_order::Model,
) -> Result<()> {
  let sv = app.sv();
  let pharmacy = sv.pharmacy.by_name(&confirmed.pharmacy_name).await?;
  let rep = sv.user.by_id(confirmed.user_id).await?;

  let to = [pharmacy.and_then(|p| p.email), rep.and_then(|r| r.email)]
    .into_iter()
    .flatten()
    .collect();
  app.mailer.send(Mail::order_confirmed(confirmed, to));
  Ok(())
}

pub async fn confirm_pending(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
  Path(order_id): Path<String>,
) -> Result<Json<Message>> {
  auth.require_admin()?;

  let done = app.sv().order.confirm(&order_id).await?;

  if app.mailer.enabled()
    && let Err(err) = notify_confirmed(&app, &done.confirmed).await
  {
    warn!("Confirmation mail for {order_id} skipped: {err}");
  }

  Ok(Message::new("Order confirmed successfully"))
}

pub async fn confirmed_orders(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
) -> Result<Json<Vec<confirmed_order::Model>>> {
  Ok(Json(app.sv().order.confirmed(auth.scope()).await?))
}
