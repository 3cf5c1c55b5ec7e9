//! SeaORM entity for the enrollments table.
//!
//! Uniqueness of the (student_id, course_id) pair is a composite index
//! declared in the migration; the violation is remapped at the
//! repository boundary.

use sea_orm::entity::prelude::*;

use crate::domain::{Enrollment, EnrollmentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTimeUtc,
    pub status: String,
    pub completed_at: Option<DateTimeUtc>,
    pub grade: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::StudentId",
        to = "super::profile::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Enrollment {
    fn from(model: Model) -> Self {
        Enrollment {
            id: model.id,
            student_id: model.student_id,
            course_id: model.course_id,
            enrolled_at: model.enrolled_at,
            status: EnrollmentStatus::from(model.status.as_str()),
            completed_at: model.completed_at,
            grade: model.grade,
        }
    }
}
