use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use super::{Message, Payload};
use crate::{
  entity::{UserRole, user},
  plugins::server::auth::{self, AuthUser},
  prelude::*,
  state::AppState,
  sv::user::NewUser,
};

#[derive(Deserialize)]
pub struct LoginReq {
  pub username: String,
  pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResp {
  pub token: String,
  pub expires_at: i64,
  pub user: user::Model,
}

/// Open while no account exists, so the first user bootstraps as admin.
pub async fn register(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Payload(mut new): Payload<NewUser>,
) -> Result<Json<user::Model>> {
  let sv = app.sv();

  if sv.user.count().await? == 0 {
    new.role = UserRole::Admin;
  } else {
    AuthUser::from_headers(&app, &headers)?
      .ok_or(Error::Unauthorized)?
      .require_admin()?;
  }

  let user = sv.user.register(new).await?;
  info!("Registered {} ({:?})", user.username, user.role);
  Ok(Json(user))
}

pub async fn login(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<LoginReq>,
) -> Result<Json<LoginResp>> {
  let user = app.sv().user.authenticate(&req.username, &req.password).await?;
  let (token, claims) =
    auth::issue_token(&user, &app.config.jwt_secret, app.config.token_ttl)?;

  debug!("{} logged in", user.username);
  Ok(Json(LoginResp { token, expires_at: claims.exp, user }))
}

pub async fn logout(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
) -> Json<Message> {
  app.revoke(&auth.jti, auth.exp);
  debug!("{} logged out", auth.username);
  Message::new("Logged out")
}

pub async fn me(
  State(app): State<Arc<AppState>>,
  auth: AuthUser,
) -> Result<Json<user::Model>> {
  let user = app.sv().user.by_id(auth.id).await?.ok_or(Error::UserNotFound)?;
  Ok(Json(user))
}

pub async fn reps(
  State(app): State<Arc<AppState>>,
  _: AuthUser,
) -> Result<Json<Vec<user::Model>>> {
  Ok(Json(app.sv().user.reps().await?))
}
