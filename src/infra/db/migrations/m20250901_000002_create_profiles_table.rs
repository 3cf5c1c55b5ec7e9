//! Migration: Create the profiles table.
//!
//! Role-conditional fields are nullable columns guarded by the role
//! discriminant; the application keeps the other roles' columns NULL.

use sea_orm_migration::prelude::*;

use super::m20250901_000001_create_accounts_table::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Profiles::AccountId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Profiles::Role).string().not_null())
                    .col(ColumnDef::new(Profiles::Avatar).string().null())
                    .col(ColumnDef::new(Profiles::Phone).string().null())
                    .col(ColumnDef::new(Profiles::Bio).text().null())
                    .col(
                        ColumnDef::new(Profiles::StudentId)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Profiles::BirthDate).date().null())
                    .col(ColumnDef::new(Profiles::Faculty).string().null())
                    .col(ColumnDef::new(Profiles::YearOfStudy).small_integer().null())
                    .col(ColumnDef::new(Profiles::Specialization).string().null())
                    .col(ColumnDef::new(Profiles::Degree).string().null())
                    .col(ColumnDef::new(Profiles::AcademicRank).string().null())
                    .col(ColumnDef::new(Profiles::Department).string().null())
                    .col(ColumnDef::new(Profiles::Office).string().null())
                    .col(ColumnDef::new(Profiles::AdminLevel).string().null())
                    .col(
                        ColumnDef::new(Profiles::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_account")
                            .from(Profiles::Table, Profiles::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_role")
                    .table(Profiles::Table)
                    .col(Profiles::Role)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Profiles {
    Table,
    Id,
    AccountId,
    Role,
    Avatar,
    Phone,
    Bio,
    StudentId,
    BirthDate,
    Faculty,
    YearOfStudy,
    Specialization,
    Degree,
    AcademicRank,
    Department,
    Office,
    AdminLevel,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
