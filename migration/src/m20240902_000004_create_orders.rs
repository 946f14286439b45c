use sea_orm_migration::prelude::*;

use super::m20240901_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PendingOrders::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PendingOrders::OrderId)
              .string_len(16)
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(PendingOrders::PharmacyName).string().not_null())
          .col(ColumnDef::new(PendingOrders::RepName).string().not_null())
          .col(
            ColumnDef::new(PendingOrders::TotalValue).big_integer().not_null(),
          )
          .col(ColumnDef::new(PendingOrders::OrderDate).date().not_null())
          .col(ColumnDef::new(PendingOrders::UserId).integer().not_null())
          .col(
            ColumnDef::new(PendingOrders::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(
            ColumnDef::new(PendingOrders::StockReserved)
              .boolean()
              .not_null()
              .default(true),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_pending_orders_user")
              .from(PendingOrders::Table, PendingOrders::UserId)
              .to(Users::Table, Users::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_pending_orders_status")
          .table(PendingOrders::Table)
          .col(PendingOrders::Status)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(OrderDetails::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(OrderDetails::DetailId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(OrderDetails::OrderId).string_len(16).not_null())
          .col(ColumnDef::new(OrderDetails::ProductName).string().not_null())
          .col(ColumnDef::new(OrderDetails::UnitPrice).big_integer().not_null())
          .col(ColumnDef::new(OrderDetails::Quantity).integer().not_null())
          .col(
            ColumnDef::new(OrderDetails::TotalPrice).big_integer().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_order_details_order")
              .from(OrderDetails::Table, OrderDetails::OrderId)
              .to(PendingOrders::Table, PendingOrders::OrderId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_order_details_order")
          .table(OrderDetails::Table)
          .col(OrderDetails::OrderId)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(ConfirmedOrder::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ConfirmedOrder::OrderId)
              .string_len(16)
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(ConfirmedOrder::PharmacyName).string().not_null())
          .col(ColumnDef::new(ConfirmedOrder::RepName).string().not_null())
          .col(
            ColumnDef::new(ConfirmedOrder::TotalValue)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(ConfirmedOrder::OrderDate).date().not_null())
          .col(
            ColumnDef::new(ConfirmedOrder::ConfirmedDate)
              .date_time()
              .not_null(),
          )
          .col(ColumnDef::new(ConfirmedOrder::UserId).integer().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(OrderCounters::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(OrderCounters::Name)
              .string_len(32)
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(OrderCounters::Value).big_integer().not_null())
          .to_owned(),
      )
      .await?;

    // pending_orders is empty here, allocation starts at O0001
    manager
      .get_connection()
      .execute_unprepared(
        "INSERT INTO order_counters (name, value) VALUES ('pending_orders', 0)",
      )
      .await?;

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(OrderCounters::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(ConfirmedOrder::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(PendingOrders::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PendingOrders {
  Table,
  OrderId,
  PharmacyName,
  RepName,
  TotalValue,
  OrderDate,
  UserId,
  Status,
  StockReserved,
}

#[derive(DeriveIden)]
pub enum OrderDetails {
  Table,
  DetailId,
  OrderId,
  ProductName,
  UnitPrice,
  Quantity,
  TotalPrice,
}

#[derive(DeriveIden)]
pub enum ConfirmedOrder {
  Table,
  OrderId,
  PharmacyName,
  RepName,
  TotalValue,
  OrderDate,
  ConfirmedDate,
  UserId,
}

#[derive(DeriveIden)]
pub enum OrderCounters {
  Table,
  Name,
  Value,
}
