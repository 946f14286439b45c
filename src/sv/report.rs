//! Read-only projections over the order tables that feed the dashboards.

use chrono::Datelike;
use serde::Serialize;

use crate::{
  entity::{
    OrderStatus, confirmed_order, order_detail, pending_order, product,
    rep_achievement, user,
  },
  prelude::*,
  sv::achievement::MONTHS,
  utils::money,
};

pub struct Report<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
  pub month: &'static str,
  pub orders: u32,
  #[serde(with = "money")]
  pub total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPerformance {
  pub rep_id: i32,
  pub rep_name: String,
  pub month: String,
  pub year: i32,
  #[serde(with = "money")]
  pub target: i64,
  #[serde(with = "money")]
  pub total_sales: i64,
  pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
  pub product_name: String,
  pub quantity: i64,
  #[serde(with = "money")]
  pub revenue: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub pending_orders: u64,
  pub confirmed_orders: u64,
  #[serde(with = "money")]
  pub confirmed_revenue: i64,
  pub low_stock_products: u64,
}

impl<'a> Report<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Confirmed sales per calendar month of `year`, all twelve months
  /// present.
  pub async fn monthly_sales(&self, year: i32) -> Result<Vec<MonthlySales>> {
    let start = Date::from_ymd_opt(year, 1, 1)
      .ok_or_else(|| Error::InvalidArgs(format!("Invalid year {year}")))?;
    let end = Date::from_ymd_opt(year, 12, 31)
      .ok_or_else(|| Error::InvalidArgs(format!("Invalid year {year}")))?;

    let orders = confirmed_order::Entity::find()
      .filter(confirmed_order::Column::OrderDate.between(start, end))
      .all(self.db)
      .await?;

    let mut months: Vec<MonthlySales> = MONTHS
      .iter()
      .map(|&month| MonthlySales { month, orders: 0, total: 0 })
      .collect();

    for order in orders {
      let bucket = &mut months[order.order_date.month0() as usize];
      bucket.orders += 1;
      bucket.total += order.total_value;
    }

    Ok(months)
  }

  pub async fn rep_performance(
    &self,
    year: i32,
    month: Option<&str>,
  ) -> Result<Vec<RepPerformance>> {
    let mut query = rep_achievement::Entity::find()
      .filter(rep_achievement::Column::Year.eq(year));

    if let Some(month) = month {
      query = query.filter(rep_achievement::Column::Month.eq(month));
    }

    let rows = query.find_also_related(user::Entity).all(self.db).await?;

    let mut performance: Vec<RepPerformance> = rows
      .into_iter()
      .map(|(row, rep)| RepPerformance {
        rep_id: row.rep_id,
        rep_name: rep.map(|r| r.full_name).unwrap_or_default(),
        month: row.month,
        year: row.year,
        target: row.target,
        total_sales: row.total_sales,
        percentage: row.percentage,
      })
      .collect();

    performance.sort_by(|a, b| {
      b.total_sales.cmp(&a.total_sales).then(a.rep_id.cmp(&b.rep_id))
    });
    Ok(performance)
  }

  /// Best sellers across confirmed orders, by revenue.
  pub async fn top_products(&self, limit: usize) -> Result<Vec<ProductSales>> {
    let details = order_detail::Entity::find()
      .inner_join(pending_order::Entity)
      .filter(pending_order::Column::Status.eq(OrderStatus::Confirmed))
      .all(self.db)
      .await?;

    let mut totals: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for detail in details {
      let entry = totals.entry(detail.product_name).or_default();
      entry.0 += detail.quantity as i64;
      entry.1 += detail.total_price;
    }

    let mut ranked: Vec<ProductSales> = totals
      .into_iter()
      .map(|(product_name, (quantity, revenue))| ProductSales {
        product_name,
        quantity,
        revenue,
      })
      .collect();

    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked.truncate(limit);
    Ok(ranked)
  }

  pub async fn summary(&self, low_stock_threshold: i32) -> Result<Summary> {
    let pending_orders = pending_order::Entity::find()
      .filter(pending_order::Column::Status.eq(OrderStatus::Pending))
      .count(self.db)
      .await?;

    let confirmed: Vec<i64> = confirmed_order::Entity::find()
      .select_only()
      .column(confirmed_order::Column::TotalValue)
      .into_tuple()
      .all(self.db)
      .await?;

    let low_stock_products = product::Entity::find()
      .filter(product::Column::Quantity.lte(low_stock_threshold))
      .count(self.db)
      .await?;

    Ok(Summary {
      pending_orders,
      confirmed_orders: confirmed.len() as u64,
      confirmed_revenue: confirmed.iter().sum(),
      low_stock_products,
    })
  }
}
