use sea_orm::sea_query::{Expr, OnConflict};
use serde::Deserialize;

use crate::{
  entity::{rep_achievement, rep_achievement::Column},
  prelude::*,
  utils::money,
};

pub struct Achievement<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementFilter {
  pub rep_id: Option<i32>,
  pub year: Option<i32>,
  pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetUpdate {
  pub rep_id: i32,
  pub month: String,
  pub year: i32,
  #[serde(with = "money")]
  pub target: i64,
}

pub const MONTHS: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December",
];

/// Share of the target reached, `0` while no target is set.
pub fn percentage(total_sales: i64, target: i64) -> f64 {
  if target > 0 { total_sales as f64 / target as f64 * 100.0 } else { 0.0 }
}

/// Normalises `march`, `MARCH` or `3` to `March`.
pub fn month_name(raw: &str) -> Option<&'static str> {
  let raw = raw.trim();
  if let Ok(n) = raw.parse::<usize>() {
    return MONTHS.get(n.checked_sub(1)?).copied();
  }
  MONTHS.iter().copied().find(|m| m.eq_ignore_ascii_case(raw))
}

impl<'a> Achievement<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Adds a confirmed sale to the rep's period. The row is created with a
  /// zero target the first time, otherwise the amount is added in the same
  /// statement so concurrent confirmations cannot lose an update.
  pub async fn record_sale<C: ConnectionTrait>(
    conn: &C,
    rep_id: i32,
    month: &str,
    year: i32,
    amount: i64,
  ) -> Result<rep_achievement::Model> {
    let row = rep_achievement::ActiveModel {
      rep_id: Set(rep_id),
      month: Set(month.to_string()),
      year: Set(year),
      target: Set(0),
      total_sales: Set(amount),
      percentage: Set(0.0),
      last_updated: Set(Utc::now().naive_utc()),
    };

    rep_achievement::Entity::insert(row)
      .on_conflict(
        OnConflict::columns([Column::RepId, Column::Month, Column::Year])
          .value(Column::TotalSales, Expr::col(Column::TotalSales).add(amount))
          .update_column(Column::LastUpdated)
          .to_owned(),
      )
      .exec_without_returning(conn)
      .await?;

    Self::refresh_percentage(conn, rep_id, month, year).await
  }

  async fn refresh_percentage<C: ConnectionTrait>(
    conn: &C,
    rep_id: i32,
    month: &str,
    year: i32,
  ) -> Result<rep_achievement::Model> {
    let row = rep_achievement::Entity::find_by_id((
      rep_id,
      month.to_string(),
      year,
    ))
    .one(conn)
    .await?
    .ok_or_else(|| {
      Error::Internal(format!(
        "Achievement row for rep {rep_id} {month} {year} missing after upsert"
      ))
    })?;

    let pct = percentage(row.total_sales, row.target);
    if row.percentage == pct {
      return Ok(row);
    }

    let mut model: rep_achievement::ActiveModel = row.into();
    model.percentage = Set(pct);
    Ok(model.update(conn).await?)
  }

  pub async fn set_target(
    &self,
    update: TargetUpdate,
  ) -> Result<rep_achievement::Model> {
    if update.target < 0 {
      return Err(Error::InvalidArgs("Target cannot be negative".into()));
    }
    let month = month_name(&update.month).ok_or_else(|| {
      Error::InvalidArgs(format!("Unknown month '{}'", update.month))
    })?;

    let txn = self.db.begin().await?;

    let row = rep_achievement::ActiveModel {
      rep_id: Set(update.rep_id),
      month: Set(month.to_string()),
      year: Set(update.year),
      target: Set(update.target),
      total_sales: Set(0),
      percentage: Set(0.0),
      last_updated: Set(Utc::now().naive_utc()),
    };

    rep_achievement::Entity::insert(row)
      .on_conflict(
        OnConflict::columns([Column::RepId, Column::Month, Column::Year])
          .update_columns([Column::Target, Column::LastUpdated])
          .to_owned(),
      )
      .exec_without_returning(&txn)
      .await?;

    let row =
      Self::refresh_percentage(&txn, update.rep_id, month, update.year).await?;

    txn.commit().await?;
    Ok(row)
  }

  pub async fn get(
    &self,
    rep_id: i32,
    month: &str,
    year: i32,
  ) -> Result<Option<rep_achievement::Model>> {
    Ok(
      rep_achievement::Entity::find_by_id((rep_id, month.to_string(), year))
        .one(self.db)
        .await?,
    )
  }

  pub async fn list(
    &self,
    filter: &AchievementFilter,
  ) -> Result<Vec<rep_achievement::Model>> {
    let mut query = rep_achievement::Entity::find();

    if let Some(rep_id) = filter.rep_id {
      query = query.filter(Column::RepId.eq(rep_id));
    }
    if let Some(year) = filter.year {
      query = query.filter(Column::Year.eq(year));
    }
    if let Some(raw) = &filter.month {
      let month = month_name(raw)
        .ok_or_else(|| Error::InvalidArgs(format!("Unknown month '{raw}'")))?;
      query = query.filter(Column::Month.eq(month));
    }

    let mut rows = query.all(self.db).await?;
    rows.sort_by_key(|r| {
      let idx = MONTHS.iter().position(|m| *m == r.month).unwrap_or(12);
      (std::cmp::Reverse(r.year), idx, r.rep_id)
    });
    Ok(rows)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  #[test]
  fn test_percentage() {
    assert_eq!(percentage(25_000, 0), 0.0);
    assert_eq!(percentage(25_000, 100_000), 25.0);
    assert_eq!(percentage(150_000, 100_000), 150.0);
  }

  #[test]
  fn test_month_name() {
    assert_eq!(month_name("march"), Some("March"));
    assert_eq!(month_name(" DECEMBER "), Some("December"));
    assert_eq!(month_name("1"), Some("January"));
    assert_eq!(month_name("0"), None);
    assert_eq!(month_name("13"), None);
    assert_eq!(month_name("Smarch"), None);
  }

  #[tokio::test]
  async fn test_first_sale_creates_row() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;

    let row = Achievement::record_sale(&db, rep.id, "May", 2024, 10_000)
      .await
      .unwrap();

    assert_eq!(row.total_sales, 10_000);
    assert_eq!(row.target, 0);
    assert_eq!(row.percentage, 0.0);
  }

  #[tokio::test]
  async fn test_sales_accumulate() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;

    Achievement::record_sale(&db, rep.id, "May", 2024, 10_000).await.unwrap();
    let row = Achievement::record_sale(&db, rep.id, "May", 2024, 15_000)
      .await
      .unwrap();

    assert_eq!(row.total_sales, 25_000);
    assert_eq!(row.percentage, 0.0);

    // other periods stay separate
    let june = Achievement::record_sale(&db, rep.id, "June", 2024, 500)
      .await
      .unwrap();
    assert_eq!(june.total_sales, 500);
  }

  #[tokio::test]
  async fn test_target_drives_percentage() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Achievement::new(&db);

    Achievement::record_sale(&db, rep.id, "May", 2024, 25_000).await.unwrap();

    let row = sv
      .set_target(TargetUpdate {
        rep_id: rep.id,
        month: "may".into(),
        year: 2024,
        target: 100_000,
      })
      .await
      .unwrap();
    assert_eq!(row.total_sales, 25_000);
    assert_eq!(row.percentage, 25.0);

    let row = Achievement::record_sale(&db, rep.id, "May", 2024, 25_000)
      .await
      .unwrap();
    assert_eq!(row.percentage, 50.0);
  }

  #[tokio::test]
  async fn test_target_before_sales() {
    let db = test_db::setup().await;
    let rep = test_db::rep(&db, "alice").await;
    let sv = Achievement::new(&db);

    sv.set_target(TargetUpdate {
      rep_id: rep.id,
      month: "7".into(),
      year: 2024,
      target: 40_000,
    })
    .await
    .unwrap();

    let row = sv.get(rep.id, "July", 2024).await.unwrap().unwrap();
    assert_eq!(row.target, 40_000);
    assert_eq!(row.total_sales, 0);

    let listed = sv
      .list(&AchievementFilter {
        rep_id: Some(rep.id),
        year: Some(2024),
        month: Some("july".into()),
      })
      .await
      .unwrap();
    assert_eq!(listed.len(), 1);
  }
}
