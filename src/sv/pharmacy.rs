use serde::Deserialize;

use crate::{entity::pharmacy, prelude::*};

pub struct Pharmacy<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPharmacy {
  pub name: String,
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

impl<'a> Pharmacy<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn list(&self) -> Result<Vec<pharmacy::Model>> {
    Ok(
      pharmacy::Entity::find()
        .order_by_asc(pharmacy::Column::Name)
        .all(self.db)
        .await?,
    )
  }

  pub async fn get(&self, id: i32) -> Result<pharmacy::Model> {
    pharmacy::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PharmacyNotFound)
  }

  pub async fn by_name(&self, name: &str) -> Result<Option<pharmacy::Model>> {
    Ok(
      pharmacy::Entity::find()
        .filter(pharmacy::Column::Name.eq(name))
        .one(self.db)
        .await?,
    )
  }

  pub async fn create(&self, new: NewPharmacy) -> Result<pharmacy::Model> {
    let name = new.name.trim();
    if name.is_empty() {
      return Err(Error::InvalidArgs("Pharmacy name is required".into()));
    }

    let pharmacy = pharmacy::ActiveModel {
      id: NotSet,
      name: Set(name.to_string()),
      address: Set(new.address),
      email: Set(new.email.filter(|e| !e.trim().is_empty())),
      phone: Set(new.phone),
    };

    Ok(pharmacy.insert(self.db).await?)
  }
}
