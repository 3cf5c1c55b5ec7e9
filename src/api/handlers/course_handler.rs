//! Course catalog handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{Course, CourseLevel, InstructorResponse};
use crate::errors::AppResult;
use crate::services::{CourseUpdate, CourseWithStats, NewCourse};
use crate::types::{Paginated, PaginationParams};

/// New course payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Web Security")]
    pub title: String,
    /// Derived from the title when omitted
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, max = 500, message = "Duration must be between 1 and 500 hours"))]
    #[schema(example = 48)]
    pub duration_hours: u32,
    #[serde(default)]
    pub level: CourseLevel,
    #[validate(range(min = 1, max = 100, message = "Capacity must be between 1 and 100"))]
    pub max_students: Option<u32>,
    #[serde(default)]
    #[schema(value_type = f64, example = 4999.99)]
    pub price: Decimal,
    pub instructor_id: Option<Uuid>,
}

/// Partial course update; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 500, message = "Duration must be between 1 and 500 hours"))]
    pub duration_hours: Option<u32>,
    pub level: Option<CourseLevel>,
    /// May drop below the current enrollment; slots then go negative
    #[validate(range(min = 1, max = 100, message = "Capacity must be between 1 and 100"))]
    pub max_students: Option<u32>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    /// `null` detaches the instructor; omit to leave unchanged
    #[serde(default, with = "double_option")]
    pub instructor_id: Option<Option<Uuid>>,
}

/// Serde helper distinguishing an omitted field from an explicit null
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// Create course routes (all require authentication)
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/:slug",
            get(get_course).put(update_course).delete(deactivate_course),
        )
        .route("/:slug/enroll", post(super::enrollment_handler::enroll))
}

/// Instructor routes
pub fn instructor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_instructors))
        .route("/:id", get(get_instructor).delete(delete_instructor))
}

/// List active courses with enrollment stats
#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses((status = 200, description = "Active courses ordered by title"))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<Paginated<CourseWithStats>>> {
    let page = pagination.page;
    let per_page = pagination.limit();
    let (courses, total) = state.course_service.list_courses(pagination).await?;
    Ok(Json(Paginated::new(courses, page, per_page, total)))
}

/// Get a course by slug, with enrollment stats
#[utoipa::path(
    get,
    path = "/courses/{slug}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Course slug")),
    responses(
        (status = 200, description = "Course with stats", body = CourseWithStats),
        (status = 404, description = "No such course")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CourseWithStats>> {
    let course = state.course_service.get_by_slug(&slug).await?;
    Ok(Json(course))
}

/// Create a course (teacher or admin)
#[utoipa::path(
    post,
    path = "/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Created course", body = Course),
        (status = 400, description = "Validation error or duplicate slug"),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    require_staff(&user)?;

    let course = state
        .course_service
        .create_course(NewCourse {
            title: payload.title,
            slug: payload.slug,
            description: payload.description,
            duration_hours: payload.duration_hours,
            level: payload.level,
            max_students: payload.max_students,
            price: payload.price,
            instructor_id: payload.instructor_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Update a course (teacher or admin)
#[utoipa::path(
    put,
    path = "/courses/{slug}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Course slug")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = Course),
        (status = 404, description = "No such course")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCourseRequest>,
) -> AppResult<Json<Course>> {
    require_staff(&user)?;

    let existing = state.course_service.get_by_slug(&slug).await?;
    let course = state
        .course_service
        .update_course(
            existing.course.id,
            CourseUpdate {
                title: payload.title,
                slug: payload.slug,
                description: payload.description,
                duration_hours: payload.duration_hours,
                level: payload.level,
                max_students: payload.max_students,
                price: payload.price,
                instructor_id: payload.instructor_id,
            },
        )
        .await?;

    Ok(Json(course))
}

/// Deactivate a course (teacher or admin). The catalog entry survives
/// for existing enrollments; it just stops accepting new ones.
#[utoipa::path(
    delete,
    path = "/courses/{slug}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Course slug")),
    responses(
        (status = 200, description = "Deactivated course", body = Course),
        (status = 404, description = "No such course")
    )
)]
pub async fn deactivate_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> AppResult<Json<Course>> {
    require_staff(&user)?;

    let existing = state.course_service.get_by_slug(&slug).await?;
    let course = state
        .course_service
        .deactivate_course(existing.course.id)
        .await?;
    Ok(Json(course))
}

/// List instructors with their names and contact details
#[utoipa::path(
    get,
    path = "/instructors",
    tag = "Instructors",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All instructors, ordered by surname"))
)]
pub async fn list_instructors(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InstructorResponse>>> {
    let instructors = state.course_service.list_instructors().await?;
    Ok(Json(instructors))
}

/// Get an instructor by id
#[utoipa::path(
    get,
    path = "/instructors/{id}",
    tag = "Instructors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Instructor", body = InstructorResponse),
        (status = 404, description = "No such instructor")
    )
)]
pub async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InstructorResponse>> {
    let instructor = state.course_service.get_instructor(id).await?;
    Ok(Json(instructor))
}

/// Delete an instructor (admin only).
///
/// Their courses stay in the catalog, unstaffed.
#[utoipa::path(
    delete,
    path = "/instructors/{id}",
    tag = "Instructors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Instructor deleted; courses detached"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such instructor")
    )
)]
pub async fn delete_instructor(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&user)?;

    let detached = state.course_service.delete_instructor(id).await?;
    Ok(Json(serde_json::json!({ "detached_courses": detached })))
}
