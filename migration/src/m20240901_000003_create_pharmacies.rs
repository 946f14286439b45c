use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Pharmacies::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Pharmacies::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Pharmacies::Name)
              .string_len(128)
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Pharmacies::Address).string().null())
          .col(ColumnDef::new(Pharmacies::Email).string().null())
          .col(ColumnDef::new(Pharmacies::Phone).string().null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Pharmacies::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Pharmacies {
  Table,
  Id,
  Name,
  Address,
  Email,
  Phone,
}
