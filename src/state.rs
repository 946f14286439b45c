use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

use crate::{config::Config, prelude::*, sv};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub mailer: sv::Mailer,
  /// Logged-out token ids with their expiry (unix seconds).
  pub revoked: DashMap<String, i64>,
}

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub product: sv::Product<'a>,
  pub pharmacy: sv::Pharmacy<'a>,
  pub order: sv::Order<'a>,
  pub achievement: sv::Achievement<'a>,
  pub route: sv::Route<'a>,
  pub report: sv::Report<'a>,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.sqlx_logging(false).acquire_timeout(Duration::from_secs(8));

    let db = Database::connect(opts).await?;
    Migrator::up(&db, None).await?;

    info!("Database ready");

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    let mailer = sv::Mailer::new(config.email_webhook.clone());
    Self { db, config, mailer, revoked: DashMap::new() }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      user: sv::User::new(&self.db),
      product: sv::Product::new(&self.db),
      pharmacy: sv::Pharmacy::new(&self.db),
      order: sv::Order::new(&self.db),
      achievement: sv::Achievement::new(&self.db),
      route: sv::Route::new(&self.db),
      report: sv::Report::new(&self.db),
    }
  }

  pub fn revoke(&self, jti: &str, expires_at: i64) {
    self.revoked.insert(jti.to_string(), expires_at);
  }

  pub fn is_revoked(&self, jti: &str) -> bool {
    self.revoked.contains_key(jti)
  }

  /// Drops revocations whose tokens would have expired anyway.
  pub fn gc_revoked(&self) -> usize {
    let now = Utc::now().timestamp();
    let before = self.revoked.len();
    self.revoked.retain(|_, exp| *exp > now);
    before - self.revoked.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_gc_revoked() {
    let db = sv::test_utils::test_db::setup().await;
    let app = AppState::with_db(db, Config::for_tests());

    let now = Utc::now().timestamp();
    app.revoke("stale", now - 10);
    app.revoke("fresh", now + 600);

    assert_eq!(app.gc_revoked(), 1);
    assert!(app.is_revoked("fresh"));
    assert!(!app.is_revoked("stale"));
  }
}
