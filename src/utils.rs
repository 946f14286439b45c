use chrono::Datelike;

use crate::prelude::*;

/// Largest amount accepted from clients, in cents. Amounts up to this bound
/// convert from `f64` exactly.
pub const MAX_CENTS: i64 = 1_000_000_000_000_000;

/// Converts a decimal amount as sent by clients into cents, `None` when it is
/// not finite or exceeds [`MAX_CENTS`].
pub fn to_cents(amount: f64) -> Option<i64> {
  let cents = (amount * 100.0).round();
  (cents.is_finite() && cents.abs() <= MAX_CENTS as f64)
    .then_some(cents as i64)
}

pub fn from_cents(cents: i64) -> f64 {
  cents as f64 / 100.0
}

pub fn format_money(cents: i64) -> String {
  format!("{:.2}", from_cents(cents))
}

/// Achievement period of a date: long English month name and year.
pub fn period(date: Date) -> (String, i32) {
  (date.format("%B").to_string(), date.year())
}

/// Cents on disk, decimal numbers on the wire.
pub mod money {
  use serde::{Deserialize, Deserializer, Serializer, de::Error};

  pub(super) fn parse<E: Error>(amount: f64) -> Result<i64, E> {
    super::to_cents(amount)
      .ok_or_else(|| E::custom(format!("amount {amount} is out of range")))
  }

  pub fn serialize<S: Serializer>(
    cents: &i64,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(super::from_cents(*cents))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<i64, D::Error> {
    parse(f64::deserialize(deserializer)?)
  }

  pub mod opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
      cents: &Option<i64>,
      serializer: S,
    ) -> Result<S::Ok, S::Error> {
      match cents {
        Some(cents) => {
          serializer.serialize_some(&super::super::from_cents(*cents))
        }
        None => serializer.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
      Option::<f64>::deserialize(deserializer)?
        .map(super::parse::<D::Error>)
        .transpose()
    }
  }
}
