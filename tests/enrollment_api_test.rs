//! Handler-level tests for the enrollment lifecycle.
//!
//! Builds an AppState from hand-written mock services and calls the
//! handlers directly, so role guards and ownership checks are exercised
//! without a database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use course_registry::api::handlers::{course_handler, enrollment_handler};
use course_registry::api::middleware::CurrentUser;
use course_registry::api::AppState;
use course_registry::domain::{
    Course, CourseLevel, Enrollment, EnrollmentStatus, Faculty, InstructorResponse, Profile, Role,
    RoleDetails, StudentData,
};
use course_registry::errors::{AppError, AppResult};
use course_registry::infra::Database;
use course_registry::services::{
    AuthService, Claims, CourseService, CourseUpdate, CourseWithStats, EnrollmentService,
    NewCourse, ProfileService, Registered, StudentRegistration, TeacherRegistration,
    TokenResponse,
};
use course_registry::types::PaginationParams;

// Fixed ids so the mocks can cross-reference each other
fn student_account_id() -> Uuid {
    Uuid::from_u128(1)
}

fn student_profile_id() -> Uuid {
    Uuid::from_u128(2)
}

fn other_account_id() -> Uuid {
    Uuid::from_u128(3)
}

fn other_profile_id() -> Uuid {
    Uuid::from_u128(4)
}

fn course_id() -> Uuid {
    Uuid::from_u128(10)
}

fn enrollment_id() -> Uuid {
    Uuid::from_u128(20)
}

fn student_profile(id: Uuid, account_id: Uuid) -> Profile {
    Profile {
        id,
        account_id,
        avatar: None,
        phone: None,
        bio: None,
        details: RoleDetails::Student(StudentData {
            student_id: None,
            birth_date: None,
            faculty: Faculty::Cs,
            year_of_study: 2,
        }),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn active_course() -> Course {
    Course {
        id: course_id(),
        title: "Rust Basics".to_string(),
        slug: "rust-basics".to_string(),
        description: "Introductory Rust".to_string(),
        duration_hours: 36,
        instructor_id: None,
        level: CourseLevel::Beginner,
        max_students: 30,
        price: Decimal::ZERO,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn active_enrollment() -> Enrollment {
    Enrollment::new(enrollment_id(), student_profile_id(), course_id())
}

// =============================================================================
// Mock Services
// =============================================================================

struct StubAuthService;

#[async_trait]
impl AuthService for StubAuthService {
    async fn register_student(&self, _input: StudentRegistration) -> AppResult<Registered> {
        Err(AppError::internal("not used in these tests"))
    }

    async fn register_teacher(&self, _input: TeacherRegistration) -> AppResult<Registered> {
        Err(AppError::internal("not used in these tests"))
    }

    async fn login(&self, _identifier: String, _password: String) -> AppResult<TokenResponse> {
        Err(AppError::InvalidCredentials)
    }

    fn verify_token(&self, _token: &str) -> AppResult<Claims> {
        Err(AppError::Unauthorized)
    }
}

/// Two student profiles keyed by account id
struct StubProfileService;

#[async_trait]
impl ProfileService for StubProfileService {
    async fn get_profile(&self, id: Uuid) -> AppResult<Profile> {
        if id == student_profile_id() {
            Ok(student_profile(id, student_account_id()))
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn get_by_account(&self, account_id: Uuid) -> AppResult<Profile> {
        if account_id == student_account_id() {
            Ok(student_profile(student_profile_id(), account_id))
        } else if account_id == other_account_id() {
            Ok(student_profile(other_profile_id(), account_id))
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn list_by_role(
        &self,
        _role: Role,
        _params: PaginationParams,
    ) -> AppResult<(Vec<Profile>, u64)> {
        Ok((vec![], 0))
    }

    async fn update_contact(
        &self,
        _id: Uuid,
        _update: course_registry::domain::ContactUpdate,
    ) -> AppResult<Profile> {
        Err(AppError::internal("not used in these tests"))
    }

    async fn update_details(&self, _id: Uuid, _details: RoleDetails) -> AppResult<Profile> {
        Err(AppError::internal("not used in these tests"))
    }

    async fn promote_to_admin(
        &self,
        _id: Uuid,
        _level: course_registry::domain::AdminLevel,
    ) -> AppResult<Profile> {
        Err(AppError::internal("not used in these tests"))
    }

    async fn deactivate(&self, _id: Uuid) -> AppResult<Profile> {
        Err(AppError::internal("not used in these tests"))
    }
}

/// One active course addressed by its slug
struct StubCourseService;

fn with_stats(course: Course) -> CourseWithStats {
    let max = course.max_students as i64;
    CourseWithStats {
        course,
        enrolled_students_count: 0,
        available_slots: max,
    }
}

#[async_trait]
impl CourseService for StubCourseService {
    async fn get_course(&self, id: Uuid) -> AppResult<CourseWithStats> {
        if id == course_id() {
            Ok(with_stats(active_course()))
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<CourseWithStats> {
        if slug == "rust-basics" {
            Ok(with_stats(active_course()))
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn list_courses(
        &self,
        _params: PaginationParams,
    ) -> AppResult<(Vec<CourseWithStats>, u64)> {
        Ok((vec![with_stats(active_course())], 1))
    }

    async fn create_course(&self, input: NewCourse) -> AppResult<Course> {
        let mut course = active_course();
        course.title = input.title;
        Ok(course)
    }

    async fn update_course(&self, _id: Uuid, _update: CourseUpdate) -> AppResult<Course> {
        Ok(active_course())
    }

    async fn deactivate_course(&self, _id: Uuid) -> AppResult<Course> {
        let mut course = active_course();
        course.is_active = false;
        Ok(course)
    }

    async fn list_instructors(&self) -> AppResult<Vec<InstructorResponse>> {
        Ok(vec![])
    }

    async fn get_instructor(&self, _id: Uuid) -> AppResult<InstructorResponse> {
        Err(AppError::NotFound)
    }

    async fn delete_instructor(&self, _id: Uuid) -> AppResult<u64> {
        Ok(0)
    }
}

/// A single active enrollment owned by the fixture student
struct StubEnrollmentService;

#[async_trait]
impl EnrollmentService for StubEnrollmentService {
    async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        if student_id == other_profile_id() {
            return Err(AppError::AlreadyEnrolled);
        }
        Ok(Enrollment::new(Uuid::new_v4(), student_id, course_id))
    }

    async fn complete(&self, enrollment_id: Uuid, grade: Option<String>) -> AppResult<Enrollment> {
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.complete(grade)?;
        Ok(enrollment)
    }

    async fn cancel(&self, enrollment_id: Uuid) -> AppResult<Enrollment> {
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.cancel()?;
        Ok(enrollment)
    }

    async fn set_grade(&self, enrollment_id: Uuid, grade: String) -> AppResult<Enrollment> {
        let mut enrollment = self.get_enrollment(enrollment_id).await?;
        enrollment.set_grade(grade)?;
        Ok(enrollment)
    }

    async fn get_enrollment(&self, id: Uuid) -> AppResult<Enrollment> {
        if id == enrollment_id() {
            Ok(active_enrollment())
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn list_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        if student_id == student_profile_id() {
            Ok(vec![active_enrollment()])
        } else {
            Ok(vec![])
        }
    }

    async fn list_for_course(&self, _course_id: Uuid) -> AppResult<Vec<Enrollment>> {
        Ok(vec![active_enrollment()])
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_state() -> AppState {
    AppState::new(
        Arc::new(StubAuthService),
        Arc::new(StubProfileService),
        Arc::new(StubCourseService),
        Arc::new(StubEnrollmentService),
        Arc::new(Database::from_connection(
            sea_orm::DatabaseConnection::default(),
        )),
    )
}

fn student_user() -> CurrentUser {
    CurrentUser {
        id: student_account_id(),
        username: "anna".to_string(),
        role: Role::Student,
    }
}

fn other_student_user() -> CurrentUser {
    CurrentUser {
        id: other_account_id(),
        username: "dmitry".to_string(),
        role: Role::Student,
    }
}

fn teacher_user() -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        username: "petrov".to_string(),
        role: Role::Teacher,
    }
}

fn admin_user() -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        username: "admin".to_string(),
        role: Role::Admin,
    }
}

// =============================================================================
// Enroll
// =============================================================================

#[tokio::test]
async fn test_enroll_returns_created_for_student() {
    let result = enrollment_handler::enroll(
        State(test_state()),
        Extension(student_user()),
        Path("rust-basics".to_string()),
    )
    .await;

    let (status, body) = result.expect("enrollment should succeed");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.0.student_id, student_profile_id());
    assert_eq!(body.0.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn test_enroll_rejects_non_student_caller() {
    let result = enrollment_handler::enroll(
        State(test_state()),
        Extension(teacher_user()),
        Path("rust-basics".to_string()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_enroll_unknown_course_is_not_found() {
    let result = enrollment_handler::enroll(
        State(test_state()),
        Extension(student_user()),
        Path("no-such-course".to_string()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_enroll_twice_conflicts() {
    // The other student's profile is wired to an existing enrollment
    let result = enrollment_handler::enroll(
        State(test_state()),
        Extension(other_student_user()),
        Path("rust-basics".to_string()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::AlreadyEnrolled));
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn test_my_enrollments_resolves_caller_profile() {
    let result =
        enrollment_handler::my_enrollments(State(test_state()), Extension(student_user())).await;

    let body = result.expect("listing should succeed");
    assert_eq!(body.0.len(), 1);
    assert_eq!(body.0[0].student_id, student_profile_id());
}

#[tokio::test]
async fn test_course_roster_requires_staff() {
    let result = enrollment_handler::course_roster(
        State(test_state()),
        Extension(student_user()),
        Path(course_id()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_course_roster_allows_teacher() {
    let result = enrollment_handler::course_roster(
        State(test_state()),
        Extension(teacher_user()),
        Path(course_id()),
    )
    .await;

    assert_eq!(result.expect("roster should succeed").0.len(), 1);
}

// =============================================================================
// Cancel
// =============================================================================

#[tokio::test]
async fn test_cancel_by_owner_succeeds() {
    let result = enrollment_handler::cancel_enrollment(
        State(test_state()),
        Extension(student_user()),
        Path(enrollment_id()),
    )
    .await;

    let body = result.expect("owner can cancel");
    assert_eq!(body.0.status, EnrollmentStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_by_other_student_is_forbidden() {
    let result = enrollment_handler::cancel_enrollment(
        State(test_state()),
        Extension(other_student_user()),
        Path(enrollment_id()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_cancel_by_admin_succeeds() {
    let result = enrollment_handler::cancel_enrollment(
        State(test_state()),
        Extension(admin_user()),
        Path(enrollment_id()),
    )
    .await;

    assert_eq!(
        result.expect("staff can cancel").0.status,
        EnrollmentStatus::Cancelled
    );
}

// =============================================================================
// Course Management Guards
// =============================================================================

#[tokio::test]
async fn test_create_course_rejects_student() {
    use course_registry::api::extractors::ValidatedJson;

    let payload = course_handler::CreateCourseRequest {
        title: "New Course".to_string(),
        slug: None,
        description: String::new(),
        duration_hours: 10,
        level: CourseLevel::Beginner,
        max_students: None,
        price: Decimal::ZERO,
        instructor_id: None,
    };

    let result = course_handler::create_course(
        State(test_state()),
        Extension(student_user()),
        ValidatedJson(payload),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_create_course_allows_teacher() {
    use course_registry::api::extractors::ValidatedJson;

    let payload = course_handler::CreateCourseRequest {
        title: "New Course".to_string(),
        slug: None,
        description: String::new(),
        duration_hours: 10,
        level: CourseLevel::Beginner,
        max_students: None,
        price: Decimal::ZERO,
        instructor_id: None,
    };

    let result = course_handler::create_course(
        State(test_state()),
        Extension(teacher_user()),
        ValidatedJson(payload),
    )
    .await;

    let (status, body) = result.expect("teacher can create courses");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.0.title, "New Course");
}

#[tokio::test]
async fn test_delete_instructor_rejects_teacher() {
    let result = course_handler::delete_instructor(
        State(test_state()),
        Extension(teacher_user()),
        Path(Uuid::new_v4()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}
