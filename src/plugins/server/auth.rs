//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs. Logging out revokes the token id until the token
//! would have expired anyway.

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{UserRole, user},
  prelude::*,
  state::AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: i32,
  pub username: String,
  pub role: UserRole,
  pub jti: String,
  pub exp: i64,
  pub iat: i64,
}

/// The caller behind a valid, unrevoked token.
#[derive(Debug, Clone)]
pub struct AuthUser {
  pub id: i32,
  pub username: String,
  pub role: UserRole,
  pub jti: String,
  pub exp: i64,
}

pub fn issue_token(
  user: &user::Model,
  secret: &str,
  ttl: Duration,
) -> Result<(String, Claims)> {
  let now = Utc::now().timestamp();
  let claims = Claims {
    sub: user.id,
    username: user.username.clone(),
    role: user.role,
    jti: uuid::Uuid::new_v4().to_string(),
    exp: now + ttl.as_secs() as i64,
    iat: now,
  };

  let token = jsonwebtoken::encode(
    &Header::new(Algorithm::HS256),
    &claims,
    &EncodingKey::from_secret(secret.as_bytes()),
  )
  .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))?;

  Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
  jsonwebtoken::decode::<Claims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::new(Algorithm::HS256),
  )
  .map(|data| data.claims)
  .map_err(|e| {
    debug!("JWT validation failed: {e}");
    Error::Unauthorized
  })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
}

impl AuthUser {
  /// `Ok(None)` when no token was sent at all.
  pub fn from_headers(
    app: &AppState,
    headers: &HeaderMap,
  ) -> Result<Option<Self>> {
    let Some(token) = bearer(headers) else {
      return if headers.contains_key(header::AUTHORIZATION) {
        Err(Error::Unauthorized)
      } else {
        Ok(None)
      };
    };

    let claims = verify_token(token, &app.config.jwt_secret)?;
    if app.is_revoked(&claims.jti) {
      return Err(Error::Unauthorized);
    }

    Ok(Some(Self {
      id: claims.sub,
      username: claims.username,
      role: claims.role,
      jti: claims.jti,
      exp: claims.exp,
    }))
  }

  pub fn is_admin(&self) -> bool {
    self.role == UserRole::Admin
  }

  pub fn require_admin(&self) -> Result<()> {
    if self.is_admin() { Ok(()) } else { Err(Error::Forbidden) }
  }

  /// Reps are confined to their own rows, admins see everything.
  pub fn scope(&self) -> Option<i32> {
    if self.is_admin() { None } else { Some(self.id) }
  }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    AuthUser::from_headers(app, &parts.headers)?.ok_or(Error::Unauthorized)
  }
}
