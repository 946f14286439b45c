use std::sync::Arc;

use async_trait::async_trait;
use tokio::time;

use crate::{entity::product, plugins::Plugin, prelude::*, state::AppState};

pub struct TokenGC;

#[async_trait]
impl Plugin for TokenGC {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut interval = time::interval(Duration::from_secs(60));
    loop {
      interval.tick().await;
      let dropped = app.gc_revoked();
      if dropped > 0 {
        debug!("Dropped {dropped} expired token revocations");
      }
    }
  }
}

/// Periodically logs products running low or close to expiry.
pub struct StockWatch;

#[async_trait]
impl Plugin for StockWatch {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let interval_secs = app.config.stock_check_secs;
    if interval_secs == 0 {
      info!("StockWatch disabled via config (0 interval)");
      return Ok(());
    }

    info!(
      "StockWatch started (interval: {}s, low stock <= {}, expiry window {}d)",
      interval_secs,
      app.config.low_stock_threshold,
      app.config.expiry_window_days
    );

    let mut interval = time::interval(Duration::from_secs(interval_secs));
    loop {
      interval.tick().await;

      match check_stock(&app).await {
        Ok(report) => debug!(
          "Stock check: {} low, {} expiring",
          report.low.len(),
          report.expiring.len()
        ),
        Err(err) => error!("StockWatch failed: {}", err),
      }
    }
  }
}

/// What one stock check found.
#[derive(Debug)]
struct StockReport {
  low: Vec<product::Model>,
  expiring: Vec<product::Model>,
}

async fn check_stock(app: &AppState) -> Result<StockReport> {
  let sv = app.sv();

  let low = sv.product.low_stock(app.config.low_stock_threshold).await?;
  for product in &low {
    warn!(
      "Low stock: {} (batch {}) has {} left",
      product.name, product.batch_number, product.quantity
    );
  }

  let today = Utc::now().date_naive();
  let expiring = sv.product.expiring(app.config.expiry_window_days).await?;
  for product in &expiring {
    if product.expiry_date < today {
      warn!(
        "Expired: {} (batch {}) since {}",
        product.name, product.batch_number, product.expiry_date
      );
    } else {
      warn!(
        "Expiring: {} (batch {}) on {}",
        product.name, product.batch_number, product.expiry_date
      );
    }
  }

  Ok(StockReport { low, expiring })
}

#[cfg(test)]
mod tests {
  use chrono::Days;

  use super::*;
  use crate::{
    config::Config,
    sv::{self, product::NewProduct, test_utils::test_db},
  };

  fn names(products: &[product::Model]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
  }

  #[tokio::test]
  async fn test_check_stock_reports_low_and_expiring() {
    let db = test_db::setup().await;
    let today = Utc::now().date_naive();

    test_db::product(&db, "Ibuprofen", 2, 350).await;
    test_db::product(&db, "Paracetamol", 100, 200).await;
    for (name, expiry_date) in [
      ("Amoxicillin", today + Days::new(5)),
      ("Cetirizine", today - Days::new(3)),
    ] {
      sv::Product::new(&db)
        .create(NewProduct {
          name: name.into(),
          batch_number: format!("B-{name}"),
          expiry_date,
          quantity: 50,
          unit_price: 500,
          supplier_info: None,
        })
        .await
        .unwrap();
    }
    let app = AppState::with_db(db, Config::for_tests());

    let report = check_stock(&app).await.unwrap();
    assert_eq!(names(&report.low), ["Ibuprofen"]);
    // ordered by expiry date, the expired batch first
    assert_eq!(names(&report.expiring), ["Cetirizine", "Amoxicillin"]);
  }

  #[tokio::test]
  async fn test_check_stock_clean() {
    let db = test_db::setup().await;
    test_db::product(&db, "Paracetamol", 100, 200).await;
    let app = AppState::with_db(db, Config::for_tests());

    let report = check_stock(&app).await.unwrap();
    assert!(report.low.is_empty());
    assert!(report.expiring.is_empty());
  }
}
