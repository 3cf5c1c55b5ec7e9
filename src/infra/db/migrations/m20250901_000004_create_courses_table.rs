//! Migration: Create the courses table.
//!
//! Courses outlive their instructor: the FK declares ON DELETE SET NULL
//! as a backstop for the explicit detach the application performs.

use sea_orm_migration::prelude::*;

use super::m20250901_000003_create_instructors_table::Instructors;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(
                        ColumnDef::new(Courses::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::DurationHours).integer().not_null())
                    .col(ColumnDef::new(Courses::InstructorId).uuid().null())
                    .col(
                        ColumnDef::new(Courses::Level)
                            .string()
                            .not_null()
                            .default("BEGINNER"),
                    )
                    .col(
                        ColumnDef::new(Courses::MaxStudents)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(Courses::Price)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Courses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_instructor")
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Instructors::Table, Instructors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_instructor_id")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum Courses {
    Table,
    Id,
    Title,
    Slug,
    Description,
    DurationHours,
    InstructorId,
    Level,
    MaxStudents,
    Price,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
