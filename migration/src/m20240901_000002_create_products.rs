use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Products::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Products::ProductId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Products::Name)
              .string_len(128)
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Products::BatchNumber).string().not_null())
          .col(ColumnDef::new(Products::ExpiryDate).date().not_null())
          .col(
            ColumnDef::new(Products::Quantity).integer().not_null().default(0),
          )
          .col(ColumnDef::new(Products::UnitPrice).big_integer().not_null())
          .col(ColumnDef::new(Products::SupplierInfo).string().null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_products_expiry")
          .table(Products::Table)
          .col(Products::ExpiryDate)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Products {
  Table,
  ProductId,
  Name,
  BatchNumber,
  ExpiryDate,
  Quantity,
  UnitPrice,
  SupplierInfo,
}
