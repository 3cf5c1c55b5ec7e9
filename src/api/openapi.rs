//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, course_handler, enrollment_handler, profile_handler};
use crate::domain::{
    AccountResponse, AdminData, AdminLevel, Course, CourseLevel, Enrollment, EnrollmentStatus,
    Faculty, InstructorResponse, ProfileResponse, Role, RoleDetails, StudentData, TeacherData,
};
use crate::services::{CourseWithStats, TokenResponse};
use crate::types::PaginationMeta;

/// OpenAPI documentation for the Course Registry API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course Registry",
        version = "0.1.0",
        description = "Course enrollment API with role-based profiles, built on Axum and SeaORM",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "API Support", email = "support@example.com")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
        (url = "https://api.example.com", description = "Production server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Profile endpoints
        profile_handler::get_my_profile,
        profile_handler::update_my_contact,
        profile_handler::update_my_details,
        profile_handler::list_profiles,
        profile_handler::get_profile,
        profile_handler::promote_profile,
        profile_handler::deactivate_profile,
        // Course endpoints
        course_handler::list_courses,
        course_handler::get_course,
        course_handler::create_course,
        course_handler::update_course,
        course_handler::deactivate_course,
        course_handler::list_instructors,
        course_handler::get_instructor,
        course_handler::delete_instructor,
        // Enrollment endpoints
        enrollment_handler::enroll,
        enrollment_handler::my_enrollments,
        enrollment_handler::course_roster,
        enrollment_handler::complete_enrollment,
        enrollment_handler::cancel_enrollment,
        enrollment_handler::grade_enrollment,
    ),
    components(
        schemas(
            // Domain types
            Role,
            Faculty,
            AdminLevel,
            RoleDetails,
            StudentData,
            TeacherData,
            AdminData,
            AccountResponse,
            ProfileResponse,
            Course,
            CourseLevel,
            InstructorResponse,
            Enrollment,
            EnrollmentStatus,
            CourseWithStats,
            PaginationMeta,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::RegisterStudentRequest,
            auth_handler::RegisterTeacherRequest,
            auth_handler::LoginRequest,
            auth_handler::RegisterResponse,
            TokenResponse,
            // Profile handler types
            profile_handler::UpdateContactRequest,
            profile_handler::PromoteRequest,
            // Course handler types
            course_handler::CreateCourseRequest,
            course_handler::UpdateCourseRequest,
            // Enrollment handler types
            enrollment_handler::CompleteRequest,
            enrollment_handler::GradeRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration and login"),
        (name = "Profiles", description = "Role-based profile management"),
        (name = "Courses", description = "Course catalog operations"),
        (name = "Instructors", description = "Instructor management"),
        (name = "Enrollments", description = "Enrollment lifecycle operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
