//! Order lifecycle: placement, cancellation with stock restoration and
//! confirmation into the sales ledger.
//!
//! Every operation runs inside one database transaction. The transaction is
//! only committed at the end of the happy path; any early return drops it,
//! which rolls everything back.

use futures::future;
use sea_orm::sea_query::{Expr, OnConflict};

use crate::{
  entity::{
    OrderStatus, confirmed_order, order_counter, order_detail, pending_order,
    product, rep_achievement,
  },
  prelude::*,
  sv::Achievement,
  utils,
};

/// Counter row used to allocate `O####` order ids.
pub const ORDER_SEQUENCE: &str = "pending_orders";

/// How placing an order treats product stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockPolicy {
  /// Decrement stock per line item now (rep order path).
  Reserve,
  /// Leave stock untouched (cart checkout path).
  Leave,
}

#[derive(Debug, Clone)]
pub struct LineItem {
  pub product_name: String,
  /// Cents.
  pub unit_price: i64,
  pub quantity: i32,
  /// Cents, defaults to `unit_price * quantity`.
  pub total_price: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
  pub pharmacy_name: String,
  pub rep_name: String,
  pub user_id: i32,
  pub order_date: Date,
  /// Cents, defaults to the sum of line totals.
  pub total_value: Option<i64>,
  pub items: Vec<LineItem>,
}

#[derive(Debug)]
pub struct Confirmation {
  pub order: pending_order::Model,
  pub confirmed: confirmed_order::Model,
  pub achievement: rep_achievement::Model,
}

pub fn format_order_id(n: i64) -> String {
  format!("O{n:04}")
}

pub fn parse_order_number(order_id: &str) -> Option<i64> {
  order_id.strip_prefix('O')?.parse().ok()
}

impl LineItem {
  fn line_total(&self) -> Result<i64> {
    if let Some(total) = self.total_price {
      return Ok(total);
    }
    self.unit_price.checked_mul(self.quantity as i64).ok_or_else(|| {
      Error::InvalidArgs(format!(
        "Total for '{}' is out of range",
        self.product_name
      ))
    })
  }
}

impl NewOrder {
  /// Checks the pharmacy and line items, returning the order total in cents.
  /// Needs no database access.
  pub fn validate_lines(&self) -> Result<i64> {
    if self.pharmacy_name.trim().is_empty() {
      return Err(Error::InvalidArgs("Pharmacy name is required".into()));
    }
    if self.items.is_empty() {
      return Err(Error::InvalidArgs(
        "Order must contain at least one item".into(),
      ));
    }

    let mut sum = 0i64;
    for item in &self.items {
      if item.product_name.trim().is_empty() {
        return Err(Error::InvalidArgs(
          "Every item needs a product name".into(),
        ));
      }
      if item.quantity <= 0 {
        return Err(Error::InvalidArgs(format!(
          "Quantity for '{}' must be positive",
          item.product_name
        )));
      }
      if item.unit_price < 0 || item.total_price.is_some_and(|t| t < 0) {
        return Err(Error::InvalidArgs(format!(
          "Prices for '{}' cannot be negative",
          item.product_name
        )));
      }

      sum = sum.checked_add(item.line_total()?).ok_or_else(|| {
        Error::InvalidArgs("Order total is out of range".into())
      })?;
    }

    match self.total_value {
      Some(total) if total < 0 => {
        Err(Error::InvalidArgs("Order total cannot be negative".into()))
      }
      Some(total) => Ok(total),
      None => Ok(sum),
    }
  }

  fn validate(&self) -> Result<i64> {
    if self.rep_name.trim().is_empty() {
      return Err(Error::InvalidArgs("Rep name is required".into()));
    }
    self.validate_lines()
  }
}

pub struct Order<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Order<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Allocates the next order id inside the caller's transaction.
  ///
  /// Bumping the counter row write-locks it until the transaction ends, so
  /// concurrent placements are serialised instead of reading the same
  /// maximum. A missing counter row is seeded from the highest id already
  /// stored; racing seeders collapse onto one row and then bump it in turn.
  pub async fn next_order_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    if Self::bump_counter(conn).await? == 0 {
      let seed = Self::highest_order_number(conn).await?;
      order_counter::Entity::insert(order_counter::ActiveModel {
        name: Set(ORDER_SEQUENCE.to_string()),
        value: Set(seed),
      })
      .on_conflict(
        OnConflict::column(order_counter::Column::Name)
          .do_nothing_on([order_counter::Column::Name])
          .to_owned(),
      )
      .exec_without_returning(conn)
      .await?;

      if Self::bump_counter(conn).await? == 0 {
        return Err(Error::Internal("Order counter could not be seeded".into()));
      }
    }

    let value = order_counter::Entity::find_by_id(ORDER_SEQUENCE)
      .one(conn)
      .await?
      .map(|counter| counter.value)
      .ok_or_else(|| Error::Internal("Order counter vanished".into()))?;

    Ok(format_order_id(value))
  }

  async fn bump_counter<C: ConnectionTrait>(conn: &C) -> Result<u64> {
    use order_counter::Column;

    let bumped = order_counter::Entity::update_many()
      .col_expr(Column::Value, Expr::col(Column::Value).add(1))
      .filter(Column::Name.eq(ORDER_SEQUENCE))
      .exec(conn)
      .await?;

    Ok(bumped.rows_affected)
  }

  async fn highest_order_number<C: ConnectionTrait>(conn: &C) -> Result<i64> {
    let ids: Vec<String> = pending_order::Entity::find()
      .select_only()
      .column(pending_order::Column::OrderId)
      .into_tuple()
      .all(conn)
      .await?;

    Ok(ids.iter().filter_map(|id| parse_order_number(id)).max().unwrap_or(0))
  }

  /// Adds `delta` to a product's stock, returns the number of rows touched.
  async fn adjust_stock<C: ConnectionTrait>(
    conn: &C,
    product_name: &str,
    delta: i32,
  ) -> Result<u64> {
    let result = product::Entity::update_many()
      .col_expr(
        product::Column::Quantity,
        Expr::col(product::Column::Quantity).add(delta),
      )
      .filter(product::Column::Name.eq(product_name))
      .exec(conn)
      .await?;

    Ok(result.rows_affected)
  }

  pub async fn place(
    &self,
    new: NewOrder,
    policy: StockPolicy,
  ) -> Result<pending_order::Model> {
    let total_value = new.validate()?;

    let txn = self.db.begin().await?;

    let order_id = Self::next_order_id(&txn).await?;

    let order = pending_order::ActiveModel {
      order_id: Set(order_id.clone()),
      pharmacy_name: Set(new.pharmacy_name.trim().to_string()),
      rep_name: Set(new.rep_name.trim().to_string()),
      total_value: Set(total_value),
      order_date: Set(new.order_date),
      user_id: Set(new.user_id),
      status: Set(OrderStatus::Pending),
      stock_reserved: Set(policy == StockPolicy::Reserve),
    }
    .insert(&txn)
    .await?;

    let details = new
      .items
      .iter()
      .map(|item| {
        Ok(order_detail::ActiveModel {
          detail_id: NotSet,
          order_id: Set(order_id.clone()),
          product_name: Set(item.product_name.trim().to_string()),
          unit_price: Set(item.unit_price),
          quantity: Set(item.quantity),
          total_price: Set(item.line_total()?),
        })
      })
      .collect::<Result<Vec<_>>>()?;
    order_detail::Entity::insert_many(details)
      .exec_without_returning(&txn)
      .await?;

    if policy == StockPolicy::Reserve {
      for item in &new.items {
        let name = item.product_name.trim();
        // reserving stock of a product that does not exist is refused
        if Self::adjust_stock(&txn, name, -item.quantity).await? == 0 {
          return Err(Error::InvalidArgs(format!("Unknown product '{name}'")));
        }
      }
    }

    txn.commit().await?;

    info!(
      "Order {} placed for {} by {} ({} items, {}, {:?})",
      order.order_id,
      order.pharmacy_name,
      order.rep_name,
      new.items.len(),
      utils::format_money(order.total_value),
      policy
    );
    Ok(order)
  }

  pub async fn get(&self, order_id: &str) -> Result<pending_order::Model> {
    pending_order::Entity::find_by_id(order_id)
      .one(self.db)
      .await?
      .ok_or(Error::OrderNotFound)
  }

  pub async fn details(
    &self,
    order_id: &str,
  ) -> Result<Vec<order_detail::Model>> {
    Ok(
      order_detail::Entity::find()
        .filter(order_detail::Column::OrderId.eq(order_id))
        .order_by_asc(order_detail::Column::DetailId)
        .all(self.db)
        .await?,
    )
  }

  /// Pending orders with their line items, optionally only one rep's.
  pub async fn pending(
    &self,
    user_id: Option<i32>,
  ) -> Result<Vec<(pending_order::Model, Vec<order_detail::Model>)>> {
    let mut query = pending_order::Entity::find()
      .filter(pending_order::Column::Status.eq(OrderStatus::Pending));

    if let Some(user_id) = user_id {
      query = query.filter(pending_order::Column::UserId.eq(user_id));
    }

    Ok(
      query
        .order_by_asc(pending_order::Column::OrderId)
        .find_with_related(order_detail::Entity)
        .all(self.db)
        .await?,
    )
  }

  /// Cancels a pending order. Stock taken at placement is given back, then
  /// the details and the order itself are removed.
  pub async fn cancel(&self, order_id: &str) -> Result<pending_order::Model> {
    let txn = self.db.begin().await?;

    let order = pending_order::Entity::find_by_id(order_id)
      .one(&txn)
      .await?
      .ok_or(Error::OrderNotFound)?;

    if order.status != OrderStatus::Pending {
      return Err(Error::OrderNotPending);
    }

    let details = order_detail::Entity::find()
      .filter(order_detail::Column::OrderId.eq(order_id))
      .all(&txn)
      .await?;

    if order.stock_reserved {
      let restored = future::try_join_all(details.iter().map(|detail| {
        Self::adjust_stock(&txn, &detail.product_name, detail.quantity)
      }))
      .await?;

      for (detail, rows) in details.iter().zip(restored) {
        if rows == 0 {
          warn!(
            "Order {order_id}: product '{}' no longer exists, {} units not restored",
            detail.product_name, detail.quantity
          );
        }
      }
    }

    order_detail::Entity::delete_many()
      .filter(order_detail::Column::OrderId.eq(order_id))
      .exec(&txn)
      .await?;

    let deleted =
      pending_order::Entity::delete_by_id(order_id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
      return Err(Error::OrderNotFound);
    }

    txn.commit().await?;

    info!("Order {order_id} cancelled, {} lines removed", details.len());
    Ok(order)
  }

  /// Moves a pending order into the confirmed ledger and credits the rep's
  /// achievement for the order's month.
  pub async fn confirm(&self, order_id: &str) -> Result<Confirmation> {
    let txn = self.db.begin().await?;

    let order = pending_order::Entity::find_by_id(order_id)
      .one(&txn)
      .await?
      .ok_or(Error::OrderNotFound)?;

    if order.status != OrderStatus::Pending {
      return Err(Error::OrderNotPending);
    }

    let (month, year) = utils::period(order.order_date);

    let confirmed = confirmed_order::Model {
      order_id: order.order_id.clone(),
      pharmacy_name: order.pharmacy_name.clone(),
      rep_name: order.rep_name.clone(),
      total_value: order.total_value,
      order_date: order.order_date,
      confirmed_date: Utc::now().naive_utc(),
      user_id: order.user_id,
    };

    let inserted = confirmed_order::Entity::insert(
      confirmed_order::ActiveModel::from(confirmed.clone()).reset_all(),
    )
    .exec_without_returning(&txn)
    .await?;
    if inserted == 0 {
      return Err(Error::OrderNotFound);
    }

    let achievement = Achievement::record_sale(
      &txn,
      order.user_id,
      &month,
      year,
      order.total_value,
    )
    .await?;

    let mut model: pending_order::ActiveModel = order.into();
    model.status = Set(OrderStatus::Confirmed);
    let order = model.update(&txn).await?;

    txn.commit().await?;

    info!(
      "Order {} confirmed: {} credited to rep {} for {} {}",
      order.order_id,
      utils::format_money(order.total_value),
      order.user_id,
      month,
      year
    );
    Ok(Confirmation { order, confirmed, achievement })
  }

  /// The confirmed ledger, newest first.
  pub async fn confirmed(
    &self,
    user_id: Option<i32>,
  ) -> Result<Vec<confirmed_order::Model>> {
    let mut query = confirmed_order::Entity::find();

    if let Some(user_id) = user_id {
      query = query.filter(confirmed_order::Column::UserId.eq(user_id));
    }

    Ok(
      query
        .order_by_desc(confirmed_order::Column::ConfirmedDate)
        .order_by_desc(confirmed_order::Column::OrderId)
        .all(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{product, user},
    sv::test_utils::test_db,
  };

  fn may_10() -> Date {
    Date::from_ymd_opt(2024, 5, 10).unwrap()
  }

  fn item(name: &str, quantity: i32, unit_price: i64) -> LineItem {
    LineItem {
      product_name: name.into(),
      unit_price,
      quantity,
      total_price: None,
    }
  }

  fn order_for(rep: &user::Model, items: Vec<LineItem>) -> NewOrder {
    NewOrder {
      pharmacy_name: "Test Pharmacy".into(),
      rep_name: rep.full_name.clone(),
      user_id: rep.id,
      order_date: may_10(),
      total_value: None,
      items,
    }
  }

  async fn stock(db: &DatabaseConnection, name: &str) -> i32 {
    product::Entity::find()
      .filter(product::Column::Name.eq(name))
      .one(db)
      .await
      .unwrap()
      .unwrap()
      .quantity
  }

  async fn achievement(
    db: &DatabaseConnection,
    rep_id: i32,
  ) -> Option<rep_achievement::Model> {
    rep_achievement::Entity::find_by_id((rep_id, "May".to_string(), 2024))
      .one(db)
      .await
      .unwrap()
  }

  #[test]
  fn test_order_id_format() {
    assert_eq!(format_order_id(1), "O0001");
    assert_eq!(format_order_id(42), "O0042");
    assert_eq!(format_order_id(12345), "O12345");
    assert_eq!(parse_order_number("O0042"), Some(42));
    assert_eq!(parse_order_number("O12345"), Some(12345));
    assert_eq!(parse_order_number("X0042"), None);
  }

  #[tokio::test]
  async fn test_reserve_then_cancel_restores_stock() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;
    test_db::product(&db, "Ibuprofen", 30, 350).await;

    let sv = Order::new(&db);
    let order = sv
      .place(
        order_for(&rep, vec![
          item("Paracetamol", 10, 200),
          item("Ibuprofen", 3, 350),
        ]),
        StockPolicy::Reserve,
      )
      .await
      .unwrap();

    assert!(order.stock_reserved);
    assert_eq!(order.total_value, 10 * 200 + 3 * 350);
    assert_eq!(stock(&db, "Paracetamol").await, 90);
    assert_eq!(stock(&db, "Ibuprofen").await, 27);

    sv.cancel(&order.order_id).await.unwrap();

    assert_eq!(stock(&db, "Paracetamol").await, 100);
    assert_eq!(stock(&db, "Ibuprofen").await, 30);
    assert!(sv.details(&order.order_id).await.unwrap().is_empty());
    assert!(matches!(sv.get(&order.order_id).await, Err(Error::OrderNotFound)));
  }

  #[tokio::test]
  async fn test_cart_checkout_leaves_stock() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;

    let sv = Order::new(&db);
    let order = sv
      .place(
        order_for(&rep, vec![item("Paracetamol", 10, 200)]),
        StockPolicy::Leave,
      )
      .await
      .unwrap();

    assert!(!order.stock_reserved);
    assert_eq!(stock(&db, "Paracetamol").await, 100);

    sv.cancel(&order.order_id).await.unwrap();
    assert_eq!(stock(&db, "Paracetamol").await, 100);
  }

  #[tokio::test]
  async fn test_order_ids_increase() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;

    let sv = Order::new(&db);
    let mut ids = Vec::new();
    for _ in 0..3 {
      let order = sv
        .place(
          order_for(&rep, vec![item("Paracetamol", 1, 200)]),
          StockPolicy::Leave,
        )
        .await
        .unwrap();
      ids.push(order.order_id);
    }

    assert_eq!(ids, ["O0001", "O0002", "O0003"]);

    // cancelling does not hand out an id twice
    sv.cancel("O0003").await.unwrap();
    let next = sv
      .place(
        order_for(&rep, vec![item("Paracetamol", 1, 200)]),
        StockPolicy::Leave,
      )
      .await
      .unwrap();
    assert_eq!(next.order_id, "O0004");
  }

  #[tokio::test]
  async fn test_counter_seeds_from_existing_orders() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;

    pending_order::ActiveModel {
      order_id: Set("O0041".into()),
      pharmacy_name: Set("Legacy Pharmacy".into()),
      rep_name: Set(rep.full_name.clone()),
      total_value: Set(1000),
      order_date: Set(may_10()),
      user_id: Set(rep.id),
      status: Set(OrderStatus::Confirmed),
      stock_reserved: Set(true),
    }
    .insert(&db)
    .await
    .unwrap();

    let order = Order::new(&db)
      .place(
        order_for(&rep, vec![item("Paracetamol", 1, 200)]),
        StockPolicy::Leave,
      )
      .await
      .unwrap();

    assert_eq!(order.order_id, "O0042");
  }

  #[tokio::test]
  async fn test_validation_rejects_before_touching_db() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let empty = sv.place(order_for(&rep, vec![]), StockPolicy::Reserve).await;
    assert!(matches!(empty, Err(Error::InvalidArgs(_))));

    let zero = sv
      .place(
        order_for(&rep, vec![item("Paracetamol", 0, 200)]),
        StockPolicy::Reserve,
      )
      .await;
    assert!(matches!(zero, Err(Error::InvalidArgs(_))));

    let mut no_pharmacy = order_for(&rep, vec![item("Paracetamol", 1, 200)]);
    no_pharmacy.pharmacy_name = "  ".into();
    assert!(matches!(
      sv.place(no_pharmacy, StockPolicy::Leave).await,
      Err(Error::InvalidArgs(_))
    ));

    assert_eq!(order_counter::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_out_of_range_totals_rejected() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let huge_line = order_for(&rep, vec![item(
      "Paracetamol",
      10_000,
      utils::to_cents(1e13).unwrap(),
    )]);
    assert!(matches!(
      sv.place(huge_line, StockPolicy::Leave).await,
      Err(Error::InvalidArgs(_))
    ));

    let mut first = item("Paracetamol", 1, 200);
    first.total_price = Some(i64::MAX);
    let mut second = item("Ibuprofen", 1, 350);
    second.total_price = Some(i64::MAX);
    assert!(matches!(
      sv.place(order_for(&rep, vec![first, second]), StockPolicy::Leave)
        .await,
      Err(Error::InvalidArgs(_))
    ));

    assert_eq!(order_counter::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(pending_order::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_negative_order_total_rejected() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let mut order = order_for(&rep, vec![item("Paracetamol", 1, 200)]);
    order.total_value = Some(-50_000);
    assert!(matches!(
      sv.place(order, StockPolicy::Leave).await,
      Err(Error::InvalidArgs(_))
    ));

    let mut order = order_for(&rep, vec![item("Paracetamol", 1, 200)]);
    order.total_value = Some(0);
    let placed = sv.place(order, StockPolicy::Leave).await.unwrap();
    assert_eq!(placed.total_value, 0);
  }

  #[tokio::test]
  async fn test_concurrent_placements_get_distinct_ids() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let placed = future::join_all((0..5).map(|_| {
      sv.place(
        order_for(&rep, vec![item("Paracetamol", 1, 200)]),
        StockPolicy::Leave,
      )
    }))
    .await;

    let mut ids: Vec<String> =
      placed.into_iter().map(|order| order.unwrap().order_id).collect();
    ids.sort();
    assert_eq!(ids, ["O0001", "O0002", "O0003", "O0004", "O0005"]);
    assert_eq!(order_counter::Entity::find().count(&db).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn test_unknown_product_rolls_back_reservation() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;

    let result = Order::new(&db)
      .place(
        order_for(&rep, vec![
          item("Paracetamol", 10, 200),
          item("Unobtainium", 1, 100),
        ]),
        StockPolicy::Reserve,
      )
      .await;

    assert!(matches!(result, Err(Error::InvalidArgs(_))));
    assert_eq!(stock(&db, "Paracetamol").await, 100);
    assert_eq!(pending_order::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(order_detail::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_stock_can_go_negative() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 5, 200).await;

    Order::new(&db)
      .place(
        order_for(&rep, vec![item("Paracetamol", 8, 200)]),
        StockPolicy::Reserve,
      )
      .await
      .unwrap();

    assert_eq!(stock(&db, "Paracetamol").await, -3);
  }

  #[tokio::test]
  async fn test_confirm_first_order_creates_achievement() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;

    let sv = Order::new(&db);
    let order = sv
      .place(
        order_for(&rep, vec![item("Paracetamol", 50, 200)]),
        StockPolicy::Reserve,
      )
      .await
      .unwrap();

    assert!(achievement(&db, rep.id).await.is_none());

    let confirmation = sv.confirm(&order.order_id).await.unwrap();
    assert_eq!(confirmation.order.status, OrderStatus::Confirmed);
    assert_eq!(confirmation.achievement.total_sales, 10_000);

    let row = achievement(&db, rep.id).await.unwrap();
    assert_eq!(row.total_sales, 10_000);
    assert_eq!(row.target, 0);
    assert_eq!(row.percentage, 0.0);
  }

  #[tokio::test]
  async fn test_confirmations_accumulate() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let mut first = order_for(&rep, vec![item("Paracetamol", 1, 10_000)]);
    first.total_value = Some(10_000);
    let mut second = order_for(&rep, vec![item("Paracetamol", 1, 15_000)]);
    second.total_value = Some(15_000);

    let first = sv.place(first, StockPolicy::Leave).await.unwrap();
    let second = sv.place(second, StockPolicy::Leave).await.unwrap();

    sv.confirm(&first.order_id).await.unwrap();
    sv.confirm(&second.order_id).await.unwrap();

    let row = achievement(&db, rep.id).await.unwrap();
    assert_eq!(row.total_sales, 25_000);
    assert_eq!(row.percentage, 0.0);
    assert_eq!(sv.confirmed(Some(rep.id)).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn test_concurrent_confirmations_sum_exactly() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let mut ids = Vec::new();
    for price in [10_000, 15_000, 2_500, 700] {
      let order = sv
        .place(
          order_for(&rep, vec![item("Paracetamol", 1, price)]),
          StockPolicy::Leave,
        )
        .await
        .unwrap();
      ids.push(order.order_id);
    }

    let confirmed =
      future::join_all(ids.iter().map(|id| sv.confirm(id))).await;
    assert!(confirmed.iter().all(Result::is_ok));

    let row = achievement(&db, rep.id).await.unwrap();
    assert_eq!(row.total_sales, 10_000 + 15_000 + 2_500 + 700);
    assert_eq!(rep_achievement::Entity::find().count(&db).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn test_failed_achievement_rolls_back_confirmation() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Order::new(&db);

    let order = sv
      .place(
        order_for(&rep, vec![item("Paracetamol", 10, 200)]),
        StockPolicy::Leave,
      )
      .await
      .unwrap();

    db.execute_unprepared("DROP TABLE rep_achievements").await.unwrap();

    let result = sv.confirm(&order.order_id).await;
    assert!(matches!(result, Err(Error::Db(_))));

    let order = sv.get(&order.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(confirmed_order::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_missing_order_changes_nothing() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;

    let sv = Order::new(&db);
    sv.place(
      order_for(&rep, vec![item("Paracetamol", 10, 200)]),
      StockPolicy::Reserve,
    )
    .await
    .unwrap();

    assert!(matches!(sv.cancel("O9999").await, Err(Error::OrderNotFound)));
    assert!(matches!(sv.confirm("O9999").await, Err(Error::OrderNotFound)));

    assert_eq!(stock(&db, "Paracetamol").await, 90);
    assert_eq!(pending_order::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(order_detail::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(confirmed_order::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(rep_achievement::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_confirmed_order_is_terminal() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;

    let sv = Order::new(&db);
    let order = sv
      .place(
        order_for(&rep, vec![item("Paracetamol", 10, 200)]),
        StockPolicy::Reserve,
      )
      .await
      .unwrap();
    sv.confirm(&order.order_id).await.unwrap();

    assert!(matches!(
      sv.confirm(&order.order_id).await,
      Err(Error::OrderNotPending)
    ));
    assert!(matches!(
      sv.cancel(&order.order_id).await,
      Err(Error::OrderNotPending)
    ));

    assert_eq!(stock(&db, "Paracetamol").await, 90);
    assert_eq!(achievement(&db, rep.id).await.unwrap().total_sales, 2000);
    assert!(sv.pending(None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_end_to_end_order_five() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    test_db::product(&db, "Paracetamol", 100, 200).await;

    let sv = Order::new(&db);
    for _ in 0..4 {
      sv.place(
        order_for(&rep, vec![item("Aspirin", 1, 100)]),
        StockPolicy::Leave,
      )
      .await
      .unwrap();
    }

    let order = sv
      .place(
        NewOrder {
          pharmacy_name: "Test Pharmacy".into(),
          rep_name: rep.full_name.clone(),
          user_id: rep.id,
          order_date: may_10(),
          total_value: None,
          items: vec![LineItem {
            product_name: "Paracetamol".into(),
            unit_price: 200,
            quantity: 10,
            total_price: Some(2000),
          }],
        },
        StockPolicy::Reserve,
      )
      .await
      .unwrap();

    assert_eq!(order.order_id, "O0005");
    assert_eq!(stock(&db, "Paracetamol").await, 90);

    let pending = sv.pending(Some(rep.id)).await.unwrap();
    let (_, items) =
      pending.iter().find(|(o, _)| o.order_id == "O0005").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total_price, 2000);

    sv.confirm("O0005").await.unwrap();

    let confirmed = confirmed_order::Entity::find_by_id("O0005")
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(confirmed.total_value, 2000);
    assert_eq!(confirmed.pharmacy_name, "Test Pharmacy");

    assert_eq!(sv.get("O0005").await.unwrap().status, OrderStatus::Confirmed);
    assert_eq!(achievement(&db, rep.id).await.unwrap().total_sales, 2000);
  }
}
