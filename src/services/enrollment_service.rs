//! Enrollment service - the enrollment lifecycle use cases.
//!
//! Transitions themselves live on the domain entity; this layer loads
//! state, applies the transition and persists the result.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Enrollment;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Enrollment service trait for dependency injection.
#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Enroll a student profile in a course.
    ///
    /// Capacity is advisory: a full course still accepts enrollments.
    /// A second enrollment for the same pair fails with a duplicate
    /// error regardless of the first one's status.
    async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment>;

    /// Mark an enrollment completed, stamping the completion time on the
    /// first transition and optionally recording a grade.
    async fn complete(&self, enrollment_id: Uuid, grade: Option<String>) -> AppResult<Enrollment>;

    /// Cancel an active enrollment.
    async fn cancel(&self, enrollment_id: Uuid) -> AppResult<Enrollment>;

    /// Assign a grade without changing status.
    async fn set_grade(&self, enrollment_id: Uuid, grade: String) -> AppResult<Enrollment>;

    async fn get_enrollment(&self, id: Uuid) -> AppResult<Enrollment>;

    /// A student's enrollment history, most recent first.
    async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>>;

    /// A course's roster, most recent enrollment first.
    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Enrollment>>;
}

/// Concrete implementation of EnrollmentService using Unit of Work.
pub struct EnrollmentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> EnrollmentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> EnrollmentService for EnrollmentManager<U> {
    async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let profile = self
            .uow
            .profiles()
            .find_by_id(student_id)
            .await?
            .ok_or_not_found()?;
        if !profile.is_student() {
            return Err(AppError::Forbidden);
        }

        let course = self
            .uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found()?;
        if !course.is_active {
            return Err(AppError::bad_request("Course is not open for enrollment"));
        }

        // Fast pre-check; the unique index catches racers and the
        // repository remaps that violation to the same error.
        if self
            .uow
            .enrollments()
            .find_by_pair(student_id, course_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyEnrolled);
        }

        let enrollment = Enrollment::new(Uuid::new_v4(), student_id, course_id);
        let enrollment = self.uow.enrollments().create(enrollment).await?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            student_id = %student_id,
            course_id = %course_id,
            "enrolled student"
        );
        Ok(enrollment)
    }

    async fn complete(&self, enrollment_id: Uuid, grade: Option<String>) -> AppResult<Enrollment> {
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.complete(grade)?;
        self.uow.enrollments().save(enrollment).await
    }

    async fn cancel(&self, enrollment_id: Uuid) -> AppResult<Enrollment> {
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.cancel()?;
        self.uow.enrollments().save(enrollment).await
    }

    async fn set_grade(&self, enrollment_id: Uuid, grade: String) -> AppResult<Enrollment> {
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.set_grade(grade)?;
        self.uow.enrollments().save(enrollment).await
    }

    async fn get_enrollment(&self, id: Uuid) -> AppResult<Enrollment> {
        self.uow.enrollments().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        self.uow.enrollments().list_for_student(student_id).await
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Enrollment>> {
        self.uow.enrollments().list_for_course(course_id).await
    }
}
