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
          .table(RoutePlans::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(RoutePlans::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(RoutePlans::RepId).integer().not_null())
          .col(ColumnDef::new(RoutePlans::VisitDate).date().not_null())
          .col(ColumnDef::new(RoutePlans::Sequence).integer().not_null())
          .col(ColumnDef::new(RoutePlans::PharmacyName).string().not_null())
          .col(ColumnDef::new(RoutePlans::Notes).string().null())
          .col(
            ColumnDef::new(RoutePlans::Visited)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(RoutePlans::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_route_plans_rep")
              .from(RoutePlans::Table, RoutePlans::RepId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_route_plans_rep_date")
          .table(RoutePlans::Table)
          .col(RoutePlans::RepId)
          .col(RoutePlans::VisitDate)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RoutePlans::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum RoutePlans {
  Table,
  Id,
  RepId,
  VisitDate,
  Sequence,
  PharmacyName,
  Notes,
  Visited,
  CreatedAt,
}
