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
          .table(RepAchievements::Table)
          .if_not_exists()
          .col(ColumnDef::new(RepAchievements::RepId).integer().not_null())
          .col(ColumnDef::new(RepAchievements::Month).string_len(16).not_null())
          .col(ColumnDef::new(RepAchievements::Year).integer().not_null())
          .col(
            ColumnDef::new(RepAchievements::Target)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(RepAchievements::TotalSales)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(RepAchievements::Percentage)
              .double()
              .not_null()
              .default(0.0),
          )
          .col(
            ColumnDef::new(RepAchievements::LastUpdated)
              .date_time()
              .not_null(),
          )
          .primary_key(
            Index::create()
              .col(RepAchievements::RepId)
              .col(RepAchievements::Month)
              .col(RepAchievements::Year),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_rep_achievements_rep")
              .from(RepAchievements::Table, RepAchievements::RepId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RepAchievements::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum RepAchievements {
  Table,
  RepId,
  Month,
  Year,
  Target,
  TotalSales,
  Percentage,
  LastUpdated,
}
