//! Enrollment repository.
//!
//! The (student_id, course_id) unique index is the source of truth for
//! duplicate enrollment; `create` remaps its violation so two racing
//! requests both see the same duplicate error.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::enrollment::{ActiveModel, Column, Entity as EnrollmentEntity};
use crate::domain::{Enrollment, EnrollmentStatus};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>>;

    async fn find_by_pair(&self, student_id: Uuid, course_id: Uuid)
        -> AppResult<Option<Enrollment>>;

    /// A student's enrollments, most recent first.
    async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>>;

    /// A course's roster, most recent enrollment first.
    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Enrollment>>;

    /// Number of ACTIVE enrollments; feeds the advisory slot count.
    async fn count_active_for_course(&self, course_id: Uuid) -> AppResult<u64>;

    async fn create(&self, enrollment: Enrollment) -> AppResult<Enrollment>;

    /// Persist the current state of an enrollment after a transition.
    async fn save(&self, enrollment: Enrollment) -> AppResult<Enrollment>;
}

/// SeaORM-backed enrollment store
pub struct EnrollmentStore {
    db: DatabaseConnection,
}

impl EnrollmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        let model = EnrollmentEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Enrollment::from))
    }

    async fn find_by_pair(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        let model = EnrollmentEntity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Enrollment::from))
    }

    async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let models = EnrollmentEntity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::EnrolledAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Enrollment::from).collect())
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let models = EnrollmentEntity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_desc(Column::EnrolledAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Enrollment::from).collect())
    }

    async fn count_active_for_course(&self, course_id: Uuid) -> AppResult<u64> {
        EnrollmentEntity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.eq(EnrollmentStatus::Active.as_str()))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn create(&self, enrollment: Enrollment) -> AppResult<Enrollment> {
        let active = ActiveModel {
            id: Set(enrollment.id),
            student_id: Set(enrollment.student_id),
            course_id: Set(enrollment.course_id),
            enrolled_at: Set(enrollment.enrolled_at),
            status: Set(enrollment.status.as_str().to_string()),
            completed_at: Set(enrollment.completed_at),
            grade: Set(enrollment.grade),
        };

        let model = active.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::AlreadyEnrolled
            } else {
                AppError::from(e)
            }
        })?;

        Ok(Enrollment::from(model))
    }

    async fn save(&self, enrollment: Enrollment) -> AppResult<Enrollment> {
        let existing = EnrollmentEntity::find_by_id(enrollment.id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(enrollment.status.as_str().to_string());
        active.completed_at = Set(enrollment.completed_at);
        active.grade = Set(enrollment.grade);

        let model = active.update(&self.db).await?;
        Ok(Enrollment::from(model))
    }
}
