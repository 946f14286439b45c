use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use crate::{
  entity::{user, user::UserRole},
  prelude::*,
};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub username: String,
  pub full_name: String,
  #[serde(default)]
  pub email: Option<String>,
  pub password: String,
  #[serde(default)]
  pub role: UserRole,
}

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| Error::Internal(format!("Failed to hash password: {e}")))?;
  Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn register(&self, new: NewUser) -> Result<user::Model> {
    let username = new.username.trim().to_lowercase();
    if username.is_empty() || new.full_name.trim().is_empty() {
      return Err(Error::InvalidArgs("Username and name are required".into()));
    }
    if new.password.len() < 8 {
      return Err(Error::InvalidArgs(
        "Password must be at least 8 characters".into(),
      ));
    }

    if self.by_username(&username).await?.is_some() {
      return Err(Error::UsernameTaken);
    }

    let now = Utc::now().naive_utc();
    let user = user::ActiveModel {
      id: NotSet,
      username: Set(username),
      full_name: Set(new.full_name.trim().to_string()),
      email: Set(new.email.filter(|e| !e.trim().is_empty())),
      role: Set(new.role),
      password_hash: Set(hash_password(&new.password)?),
      created_at: Set(now),
    };

    Ok(user.insert(self.db).await?)
  }

  pub async fn authenticate(
    &self,
    username: &str,
    password: &str,
  ) -> Result<user::Model> {
    let user = self
      .by_username(&username.trim().to_lowercase())
      .await?
      .ok_or(Error::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
      return Err(Error::InvalidCredentials);
    }

    Ok(user)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_username(
    &self,
    username: &str,
  ) -> Result<Option<user::Model>> {
    Ok(
      user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(self.db)
        .await?,
    )
  }

  pub async fn reps(&self) -> Result<Vec<user::Model>> {
    Ok(
      user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Rep))
        .order_by_asc(user::Column::FullName)
        .all(self.db)
        .await?,
    )
  }

  pub async fn count(&self) -> Result<u64> {
    Ok(user::Entity::find().count(self.db).await?)
  }
}
