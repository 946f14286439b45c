pub use sea_orm_migration::prelude::*;

mod m20240901_000001_create_users;
mod m20240901_000002_create_products;
mod m20240901_000003_create_pharmacies;
mod m20240902_000004_create_orders;
mod m20240902_000005_create_rep_achievements;
mod m20240915_000006_create_route_plans;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20240901_000001_create_users::Migration),
      Box::new(m20240901_000002_create_products::Migration),
      Box::new(m20240901_000003_create_pharmacies::Migration),
      Box::new(m20240902_000004_create_orders::Migration),
      Box::new(m20240902_000005_create_rep_achievements::Migration),
      Box::new(m20240915_000006_create_route_plans::Migration),
    ]
  }
}
