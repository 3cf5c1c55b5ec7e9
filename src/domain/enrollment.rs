//! Enrollment domain entity and its lifecycle state machine.
//!
//! An enrollment links a student profile to a course. The lifecycle is
//! `Active -> {Completed, Cancelled}` with both end states terminal; the
//! completion timestamp is stamped once and kept as a historical record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Enrollment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Completed => "COMPLETED",
            EnrollmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl From<&str> for EnrollmentStatus {
    fn from(s: &str) -> Self {
        match s {
            "COMPLETED" => EnrollmentStatus::Completed,
            "CANCELLED" => EnrollmentStatus::Cancelled,
            _ => EnrollmentStatus::Active,
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrollment domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    /// Student profile; unique together with `course_id` regardless of status
    pub student_id: Uuid,
    pub course_id: Uuid,
    /// Set once at creation, immutable afterwards
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    /// Stamped on the first transition to Completed, never cleared
    pub completed_at: Option<DateTime<Utc>>,
    pub grade: Option<String>,
}

impl Enrollment {
    /// Fresh enrollment in the initial Active state.
    pub fn new(id: Uuid, student_id: Uuid, course_id: Uuid) -> Self {
        Self {
            id,
            student_id,
            course_id,
            enrolled_at: Utc::now(),
            status: EnrollmentStatus::Active,
            completed_at: None,
            grade: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// Transition to Completed, stamping `completed_at` if unset and
    /// optionally recording a grade.
    ///
    /// Idempotent on an already-completed enrollment: the original
    /// timestamp is preserved. Fails on a cancelled enrollment, which is
    /// terminal.
    pub fn complete(&mut self, grade: Option<String>) -> AppResult<()> {
        match self.status {
            EnrollmentStatus::Active | EnrollmentStatus::Completed => {
                self.status = EnrollmentStatus::Completed;
                if self.completed_at.is_none() {
                    self.completed_at = Some(Utc::now());
                }
                if let Some(grade) = grade {
                    self.grade = Some(grade);
                }
                Ok(())
            }
            EnrollmentStatus::Cancelled => Err(AppError::invalid_transition(
                EnrollmentStatus::Cancelled.as_str(),
                EnrollmentStatus::Completed.as_str(),
            )),
        }
    }

    /// Transition to Cancelled. Does not touch `completed_at`.
    ///
    /// Cancelling an already-cancelled enrollment is a no-op; a completed
    /// enrollment cannot be cancelled.
    pub fn cancel(&mut self) -> AppResult<()> {
        match self.status {
            EnrollmentStatus::Active | EnrollmentStatus::Cancelled => {
                self.status = EnrollmentStatus::Cancelled;
                Ok(())
            }
            EnrollmentStatus::Completed => Err(AppError::invalid_transition(
                EnrollmentStatus::Completed.as_str(),
                EnrollmentStatus::Cancelled.as_str(),
            )),
        }
    }

    /// Administrative grade assignment without a status change.
    pub fn set_grade(&mut self, grade: String) -> AppResult<()> {
        if self.status == EnrollmentStatus::Cancelled {
            return Err(AppError::bad_request(
                "Cannot assign a grade to a cancelled enrollment",
            ));
        }
        self.grade = Some(grade);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment() -> Enrollment {
        Enrollment::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn new_enrollment_starts_active() {
        let e = enrollment();
        assert_eq!(e.status, EnrollmentStatus::Active);
        assert!(e.completed_at.is_none());
        assert!(e.grade.is_none());
    }

    #[test]
    fn complete_stamps_timestamp_and_grade() {
        let mut e = enrollment();
        e.complete(Some("A".to_string())).unwrap();

        assert_eq!(e.status, EnrollmentStatus::Completed);
        assert!(e.completed_at.is_some());
        assert_eq!(e.grade.as_deref(), Some("A"));
    }

    #[test]
    fn complete_is_idempotent_on_timestamp() {
        let mut e = enrollment();
        e.complete(None).unwrap();
        let first_stamp = e.completed_at;

        e.complete(Some("B".to_string())).unwrap();

        // The first stamp wins; only the grade may change
        assert_eq!(e.completed_at, first_stamp);
        assert_eq!(e.grade.as_deref(), Some("B"));
    }

    #[test]
    fn cancel_does_not_stamp_completion() {
        let mut e = enrollment();
        e.cancel().unwrap();

        assert_eq!(e.status, EnrollmentStatus::Cancelled);
        assert!(e.completed_at.is_none());
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut e = enrollment();
        e.cancel().unwrap();

        let err = e.complete(None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        // Status and timestamp are untouched by the failed transition
        assert_eq!(e.status, EnrollmentStatus::Cancelled);
        assert!(e.completed_at.is_none());
    }

    #[test]
    fn completed_cannot_be_cancelled() {
        let mut e = enrollment();
        e.complete(None).unwrap();

        let err = e.cancel().unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert_eq!(e.status, EnrollmentStatus::Completed);
    }

    #[test]
    fn grade_assignment_rejected_after_cancellation() {
        let mut e = enrollment();
        e.cancel().unwrap();

        assert!(e.set_grade("C".to_string()).is_err());
        assert!(e.grade.is_none());
    }
}
