use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0}")]
  Db(#[from] DbErr),
  #[error("{0}")]
  InvalidArgs(String),
  #[error("Order not found")]
  OrderNotFound,
  #[error("Order is not pending")]
  OrderNotPending,
  #[error("Product not found")]
  ProductNotFound,
  #[error("User not found")]
  UserNotFound,
  #[error("Pharmacy not found")]
  PharmacyNotFound,
  #[error("Route stop not found")]
  RouteNotFound,
  #[error("Product already exists")]
  ProductExists,
  #[error("Username already taken")]
  UsernameTaken,
  #[error("Invalid username or password")]
  InvalidCredentials,
  #[error("Missing or invalid token")]
  Unauthorized,
  #[error("Not allowed")]
  Forbidden,
  #[error("Internal error: {0}")]
  Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Self::OrderNotFound
      | Self::ProductNotFound
      | Self::UserNotFound
      | Self::PharmacyNotFound
      | Self::RouteNotFound => StatusCode::NOT_FOUND,
      Self::OrderNotPending | Self::ProductExists | Self::UsernameTaken => {
        StatusCode::CONFLICT
      }
      Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Forbidden => StatusCode::FORBIDDEN,
      Self::Db(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    if status.is_server_error() {
      tracing::error!("{status}: {self}");
    } else {
      tracing::warn!("{status}: {self}");
    }

    (status, Json(json::json!({ "error": self.to_string() }))).into_response()
  }
}
