use chrono::Days;
use serde::Deserialize;

use crate::{entity::product, prelude::*, utils::money};

pub struct Product<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  pub batch_number: String,
  pub expiry_date: Date,
  pub quantity: i32,
  #[serde(with = "money")]
  pub unit_price: i64,
  #[serde(default)]
  pub supplier_info: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
  pub name: Option<String>,
  pub batch_number: Option<String>,
  pub expiry_date: Option<Date>,
  pub quantity: Option<i32>,
  #[serde(default, with = "money::opt")]
  pub unit_price: Option<i64>,
  pub supplier_info: Option<String>,
}

impl<'a> Product<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn list(&self) -> Result<Vec<product::Model>> {
    Ok(
      product::Entity::find()
        .order_by_asc(product::Column::Name)
        .all(self.db)
        .await?,
    )
  }

  pub async fn get(&self, product_id: i32) -> Result<product::Model> {
    product::Entity::find_by_id(product_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProductNotFound)
  }

  pub async fn by_name(&self, name: &str) -> Result<Option<product::Model>> {
    Ok(
      product::Entity::find()
        .filter(product::Column::Name.eq(name))
        .one(self.db)
        .await?,
    )
  }

  pub async fn create(&self, new: NewProduct) -> Result<product::Model> {
    if new.name.trim().is_empty() || new.batch_number.trim().is_empty() {
      return Err(Error::InvalidArgs(
        "Product name and batch number are required".into(),
      ));
    }
    if new.unit_price < 0 {
      return Err(Error::InvalidArgs("Unit price cannot be negative".into()));
    }
    if self.by_name(new.name.trim()).await?.is_some() {
      return Err(Error::ProductExists);
    }

    let product = product::ActiveModel {
      product_id: NotSet,
      name: Set(new.name.trim().to_string()),
      batch_number: Set(new.batch_number.trim().to_string()),
      expiry_date: Set(new.expiry_date),
      quantity: Set(new.quantity),
      unit_price: Set(new.unit_price),
      supplier_info: Set(new.supplier_info),
    };

    Ok(product.insert(self.db).await?)
  }

  pub async fn update(
    &self,
    product_id: i32,
    patch: ProductPatch,
  ) -> Result<product::Model> {
    let product = self.get(product_id).await?;
    let mut model: product::ActiveModel = product.into();

    if let Some(name) = patch.name {
      if name.trim().is_empty() {
        return Err(Error::InvalidArgs("Product name cannot be empty".into()));
      }
      model.name = Set(name.trim().to_string());
    }
    if let Some(batch_number) = patch.batch_number {
      model.batch_number = Set(batch_number);
    }
    if let Some(expiry_date) = patch.expiry_date {
      model.expiry_date = Set(expiry_date);
    }
    if let Some(quantity) = patch.quantity {
      model.quantity = Set(quantity);
    }
    if let Some(unit_price) = patch.unit_price {
      if unit_price < 0 {
        return Err(Error::InvalidArgs("Unit price cannot be negative".into()));
      }
      model.unit_price = Set(unit_price);
    }
    if let Some(supplier_info) = patch.supplier_info {
      model.supplier_info = Set(Some(supplier_info));
    }

    Ok(model.update(self.db).await?)
  }

  pub async fn delete(&self, product_id: i32) -> Result<()> {
    let result =
      product::Entity::delete_by_id(product_id).exec(self.db).await?;

    if result.rows_affected == 0 {
      return Err(Error::ProductNotFound);
    }
    Ok(())
  }

  pub async fn low_stock(&self, threshold: i32) -> Result<Vec<product::Model>> {
    Ok(
      product::Entity::find()
        .filter(product::Column::Quantity.lte(threshold))
        .order_by_asc(product::Column::Quantity)
        .all(self.db)
        .await?,
    )
  }

  /// Products whose batch expires within `days` from today, already expired
  /// ones included.
  pub async fn expiring(&self, days: u32) -> Result<Vec<product::Model>> {
    let today = Utc::now().date_naive();
    let horizon = today
      .checked_add_days(Days::new(days as u64))
      .ok_or_else(|| Error::InvalidArgs("Expiry window too large".into()))?;

    Ok(
      product::Entity::find()
        .filter(product::Column::ExpiryDate.lte(horizon))
        .order_by_asc(product::Column::ExpiryDate)
        .all(self.db)
        .await?,
    )
  }
}
