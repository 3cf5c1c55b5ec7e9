//! SeaORM entity for the courses table.

use sea_orm::entity::prelude::*;

use crate::domain::{Course, CourseLevel};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub duration_hours: i32,
    pub instructor_id: Option<Uuid>,
    pub level: String,
    pub max_students: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::instructor::Entity",
        from = "Column::InstructorId",
        to = "super::instructor::Column::Id",
        on_delete = "SetNull"
    )]
    Instructor,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::instructor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Course {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            duration_hours: model.duration_hours.max(0) as u32,
            instructor_id: model.instructor_id,
            level: CourseLevel::from(model.level.as_str()),
            max_students: model.max_students.max(0) as u32,
            price: model.price,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
