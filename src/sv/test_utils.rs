//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

  use crate::{
    entity::*,
    prelude::*,
    sv::{self, product::NewProduct, user::NewUser},
  };

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmts = [
      schema.create_table_from_entity(user::Entity),
      schema.create_table_from_entity(product::Entity),
      schema.create_table_from_entity(pharmacy::Entity),
      schema.create_table_from_entity(pending_order::Entity),
      schema.create_table_from_entity(order_detail::Entity),
      schema.create_table_from_entity(confirmed_order::Entity),
      schema.create_table_from_entity(order_counter::Entity),
      schema.create_table_from_entity(rep_achievement::Entity),
      schema.create_table_from_entity(route_plan::Entity),
    ];

    for stmt in stmts {
      db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
    }

    db
  }

  pub async fn user(
    db: &DatabaseConnection,
    username: &str,
    role: UserRole,
  ) -> user::Model {
    sv::User::new(db)
      .register(NewUser {
        username: username.into(),
        full_name: format!("{username} full"),
        email: Some(format!("{username}@example.com")),
        password: "secret-pass".into(),
        role,
      })
      .await
      .unwrap()
  }

  pub async fn rep(db: &DatabaseConnection, username: &str) -> user::Model {
    user(db, username, UserRole::Rep).await
  }

  pub async fn product(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
    unit_price: i64,
  ) -> product::Model {
    sv::Product::new(db)
      .create(NewProduct {
        name: name.into(),
        batch_number: format!("B-{name}"),
        expiry_date: Date::from_ymd_opt(2030, 1, 1).unwrap(),
        quantity,
        unit_price,
        supplier_info: None,
      })
      .await
      .unwrap()
  }
}
