//! Enrollment handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{Enrollment, Role};
use crate::errors::{AppError, AppResult};

/// Completion payload; the grade is optional
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteRequest {
    #[validate(length(min = 1, max = 5, message = "Grade must be 1 to 5 characters"))]
    #[schema(example = "A")]
    pub grade: Option<String>,
}

/// Grade assignment payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GradeRequest {
    #[validate(length(min = 1, max = 5, message = "Grade must be 1 to 5 characters"))]
    #[schema(example = "B+")]
    pub grade: String,
}

/// Create enrollment routes (all require authentication)
pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(my_enrollments))
        .route("/course/:course_id", get(course_roster))
        .route("/:id/complete", post(complete_enrollment))
        .route("/:id/cancel", post(cancel_enrollment))
        .route("/:id/grade", post(grade_enrollment))
}

/// Enroll the caller in a course, addressed by slug.
///
/// Mounted under the course routes as POST /courses/{slug}/enroll.
#[utoipa::path(
    post,
    path = "/courses/{slug}/enroll",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Course slug")),
    responses(
        (status = 201, description = "Enrollment created", body = Enrollment),
        (status = 400, description = "Course closed for enrollment"),
        (status = 403, description = "Caller is not a student"),
        (status = 409, description = "Already enrolled in this course")
    )
)]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<Enrollment>)> {
    if user.role != Role::Student {
        return Err(AppError::Forbidden);
    }

    let profile = state.profile_service.get_by_account(user.id).await?;
    let course = state.course_service.get_by_slug(&slug).await?;
    let enrollment = state
        .enrollment_service
        .enroll(profile.id, course.course.id)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// The caller's own enrollments, most recent first
#[utoipa::path(
    get,
    path = "/enrollments/me",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's enrollments"))
)]
pub async fn my_enrollments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Enrollment>>> {
    let profile = state.profile_service.get_by_account(user.id).await?;
    let enrollments = state
        .enrollment_service
        .list_for_student(profile.id)
        .await?;
    Ok(Json(enrollments))
}

/// A course's roster (teacher or admin)
#[utoipa::path(
    get,
    path = "/enrollments/course/{course_id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Enrollments for the course"),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn course_roster(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<Vec<Enrollment>>> {
    require_staff(&user)?;
    let enrollments = state.enrollment_service.list_for_course(course_id).await?;
    Ok(Json(enrollments))
}

/// Mark an enrollment completed (teacher or admin)
#[utoipa::path(
    post,
    path = "/enrollments/{id}/complete",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Enrollment id")),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Completed enrollment", body = Enrollment),
        (status = 400, description = "Enrollment is cancelled"),
        (status = 404, description = "No such enrollment")
    )
)]
pub async fn complete_enrollment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CompleteRequest>,
) -> AppResult<Json<Enrollment>> {
    require_staff(&user)?;
    let enrollment = state.enrollment_service.complete(id, payload.grade).await?;
    Ok(Json(enrollment))
}

/// Cancel an enrollment.
///
/// Students may cancel their own; staff may cancel any.
#[utoipa::path(
    post,
    path = "/enrollments/{id}/cancel",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Cancelled enrollment", body = Enrollment),
        (status = 400, description = "Enrollment is completed"),
        (status = 404, description = "No such enrollment")
    )
)]
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Enrollment>> {
    if require_staff(&user).is_err() {
        // Students can only touch their own enrollment
        let profile = state.profile_service.get_by_account(user.id).await?;
        let enrollment = state.enrollment_service.get_enrollment(id).await?;
        if enrollment.student_id != profile.id {
            return Err(AppError::Forbidden);
        }
    }

    let enrollment = state.enrollment_service.cancel(id).await?;
    Ok(Json(enrollment))
}

/// Assign a grade without completing (teacher or admin)
#[utoipa::path(
    post,
    path = "/enrollments/{id}/grade",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Enrollment id")),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Graded enrollment", body = Enrollment),
        (status = 400, description = "Enrollment is cancelled"),
        (status = 404, description = "No such enrollment")
    )
)]
pub async fn grade_enrollment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<GradeRequest>,
) -> AppResult<Json<Enrollment>> {
    require_staff(&user)?;
    let enrollment = state.enrollment_service.set_grade(id, payload.grade).await?;
    Ok(Json(enrollment))
}
