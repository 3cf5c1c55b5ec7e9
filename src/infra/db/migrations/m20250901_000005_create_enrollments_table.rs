//! Migration: Create the enrollments table.
//!
//! The composite unique index on (student_id, course_id) is the source
//! of truth for duplicate enrollment; it covers all statuses.

use sea_orm_migration::prelude::*;

use super::m20250901_000002_create_profiles_table::Profiles;
use super::m20250901_000004_create_courses_table::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::Status)
                            .string()
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Enrollments::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Enrollments::Grade).string_len(5).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_student")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_course")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_enrollments_student_course")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_course_status")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .col(Enrollments::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    EnrolledAt,
    Status,
    CompletedAt,
    Grade,
}
