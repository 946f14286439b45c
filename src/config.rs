use std::env;

use anyhow::Context;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub jwt_secret: String,
  pub token_ttl: Duration,
  /// Unset disables e-mail notifications.
  pub email_webhook: Option<String>,
  pub low_stock_threshold: i32,
  pub expiry_window_days: u32,
  /// `0` disables the stock watch.
  pub stock_check_secs: u64,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let token_ttl = match env::var("TOKEN_TTL") {
      Ok(raw) => humantime::parse_duration(&raw)
        .with_context(|| format!("Invalid TOKEN_TTL '{raw}'"))?,
      Err(_) => Duration::from_secs(12 * 3600),
    };

    Ok(Self {
      database_url: env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:pharmadist.db?mode=rwc".into()),
      port: parse_or("PORT", 3000)?,
      jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET not set")?,
      token_ttl,
      email_webhook: env::var("EMAIL_WEBHOOK_URL")
        .ok()
        .filter(|url| !url.trim().is_empty()),
      low_stock_threshold: parse_or("LOW_STOCK_THRESHOLD", 10)?,
      expiry_window_days: parse_or("EXPIRY_WINDOW_DAYS", 30)?,
      stock_check_secs: parse_or("STOCK_CHECK_SECS", 3600)?,
    })
  }

  #[cfg(test)]
  pub fn for_tests() -> Self {
    Self {
      database_url: "sqlite::memory:".into(),
      port: 0,
      jwt_secret: "test-secret".into(),
      token_ttl: Duration::from_secs(3600),
      email_webhook: None,
      low_stock_threshold: 10,
      expiry_window_days: 30,
      stock_check_secs: 0,
    }
  }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(key) {
    Ok(raw) => raw.trim().parse().with_context(|| format!("Invalid {key}")),
    Err(_) => Ok(default),
  }
}
