mod account;
mod catalog;
mod orders;
mod planning;

use axum::{
  Json,
  extract::{FromRequest, Request},
};
use serde::{Serialize, de::DeserializeOwned};

pub use account::*;
pub use catalog::*;
pub use orders::*;
pub use planning::*;

use crate::prelude::*;

/// JSON body whose rejections surface as `400` validation errors.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
  S: Send + Sync,
  T: DeserializeOwned,
{
  type Rejection = Error;

  async fn from_request(req: Request, state: &S) -> Result<Self> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|e| Error::InvalidArgs(e.body_text()))?;
    Ok(Self(value))
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub order_id: Option<String>,
}

impl Message {
  pub fn new(message: impl Into<String>) -> Json<Self> {
    Json(Self { message: message.into(), order_id: None })
  }

  pub fn order(message: impl Into<String>, order_id: String) -> Json<Self> {
    Json(Self { message: message.into(), order_id: Some(order_id) })
  }
}

pub async fn health() -> &'static str {
  "OK"
}
