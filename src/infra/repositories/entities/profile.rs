//! SeaORM entity for the profiles table.
//!
//! The table stores role-conditional fields as nullable columns with a
//! role discriminant; the domain model is a tagged union. Conversion is
//! fallible: a row whose role does not match its populated columns is
//! corrupt and rejected rather than guessed at.

use sea_orm::entity::prelude::*;

use crate::domain::{
    AdminData, AdminLevel, Faculty, Profile, Role, RoleDetails, StudentData, TeacherData,
};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub account_id: Uuid,
    pub role: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    // Student columns
    #[sea_orm(unique)]
    pub student_id: Option<String>,
    pub birth_date: Option<Date>,
    pub faculty: Option<String>,
    pub year_of_study: Option<i16>,
    // Teacher columns
    pub specialization: Option<String>,
    pub degree: Option<String>,
    pub academic_rank: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
    // Admin columns
    pub admin_level: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    #[sea_orm(has_one = "super::instructor::Entity")]
    Instructor,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
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

impl TryFrom<Model> for Profile {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let details = match Role::from(model.role.as_str()) {
            Role::Student => {
                let faculty = model
                    .faculty
                    .as_deref()
                    .and_then(Faculty::parse)
                    .ok_or_else(|| corrupt(model.id, "faculty"))?;
                RoleDetails::Student(StudentData {
                    student_id: model.student_id,
                    birth_date: model.birth_date,
                    faculty,
                    year_of_study: model.year_of_study.unwrap_or(1) as u8,
                })
            }
            Role::Teacher => RoleDetails::Teacher(TeacherData {
                specialization: model
                    .specialization
                    .ok_or_else(|| corrupt(model.id, "specialization"))?,
                degree: model.degree.unwrap_or_default(),
                academic_rank: model.academic_rank.unwrap_or_default(),
                department: model.department.unwrap_or_default(),
                office: model.office.unwrap_or_default(),
            }),
            Role::Admin => {
                let admin_level = model
                    .admin_level
                    .as_deref()
                    .and_then(AdminLevel::parse)
                    .ok_or_else(|| corrupt(model.id, "admin_level"))?;
                RoleDetails::Admin(AdminData { admin_level })
            }
        };

        Ok(Profile {
            id: model.id,
            account_id: model.account_id,
            avatar: model.avatar,
            phone: model.phone,
            bio: model.bio,
            details,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn corrupt(id: Uuid, column: &str) -> AppError {
    AppError::internal(format!(
        "Profile {} has a role inconsistent with its {} column",
        id, column
    ))
}

/// Role-conditional columns flattened out of a [`RoleDetails`] value.
///
/// Every column is listed so writes reset the columns of the other roles
/// to NULL instead of leaving stale data behind.
pub struct RoleColumns {
    pub role: String,
    pub student_id: Option<String>,
    pub birth_date: Option<Date>,
    pub faculty: Option<String>,
    pub year_of_study: Option<i16>,
    pub specialization: Option<String>,
    pub degree: Option<String>,
    pub academic_rank: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
    pub admin_level: Option<String>,
}

impl From<&RoleDetails> for RoleColumns {
    fn from(details: &RoleDetails) -> Self {
        let mut columns = RoleColumns {
            role: details.role().as_str().to_string(),
            student_id: None,
            birth_date: None,
            faculty: None,
            year_of_study: None,
            specialization: None,
            degree: None,
            academic_rank: None,
            department: None,
            office: None,
            admin_level: None,
        };

        match details {
            RoleDetails::Student(data) => {
                columns.student_id = data.student_id.clone();
                columns.birth_date = data.birth_date;
                columns.faculty = Some(data.faculty.as_str().to_string());
                columns.year_of_study = Some(data.year_of_study as i16);
            }
            RoleDetails::Teacher(data) => {
                columns.specialization = Some(data.specialization.clone());
                columns.degree = Some(data.degree.clone());
                columns.academic_rank = Some(data.academic_rank.clone());
                columns.department = Some(data.department.clone());
                columns.office = Some(data.office.clone());
            }
            RoleDetails::Admin(data) => {
                columns.admin_level = Some(data.admin_level.as_str().to_string());
            }
        }

        columns
    }
}
