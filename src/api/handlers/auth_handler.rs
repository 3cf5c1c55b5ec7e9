//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{AccountResponse, Faculty, ProfileResponse};
use crate::errors::AppResult;
use crate::services::{StudentRegistration, TeacherRegistration, TokenResponse};

/// Role-tagged registration request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "UPPERCASE")]
pub enum RegisterRequest {
    Student(RegisterStudentRequest),
    Teacher(RegisterTeacherRequest),
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            RegisterRequest::Student(r) => r.validate(),
            RegisterRequest::Teacher(r) => r.validate(),
        }
    }
}

/// Student registration payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterStudentRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    /// Minimum 8 characters
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[schema(example = "SecurePass123!")]
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub faculty: Faculty,
    #[validate(range(min = 1, max = 6, message = "Year of study must be between 1 and 6"))]
    pub year_of_study: Option<u8>,
    pub student_card: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Teacher registration payload (invitation-gated)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterTeacherRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "epetrova")]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "elena@example.com")]
    pub email: String,
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[schema(example = "SecurePass123!")]
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Code handed out by the administration
    pub invitation_code: String,
    #[validate(length(min = 1, message = "Specialization is required"))]
    #[schema(example = "Distributed systems")]
    pub specialization: String,
    pub degree: Option<String>,
    pub academic_rank: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
}

/// Login request; the identifier is a username or an email
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Identifier is required"))]
    #[schema(example = "jdoe")]
    pub identifier: String,
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Registration response
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub account: AccountResponse,
    pub profile: ProfileResponse,
    /// Present for teacher registrations
    pub instructor_id: Option<Uuid>,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new account with its role profile
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered", body = RegisterResponse),
        (status = 400, description = "Validation error, weak password or bad invitation code"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let registered = match payload {
        RegisterRequest::Student(r) => {
            state
                .auth_service
                .register_student(StudentRegistration {
                    username: r.username,
                    email: r.email,
                    password: r.password,
                    password_confirm: r.password_confirm,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    faculty: r.faculty,
                    year_of_study: r.year_of_study,
                    student_card: r.student_card,
                    birth_date: r.birth_date,
                })
                .await?
        }
        RegisterRequest::Teacher(r) => {
            state
                .auth_service
                .register_teacher(TeacherRegistration {
                    username: r.username,
                    email: r.email,
                    password: r.password,
                    password_confirm: r.password_confirm,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    invitation_code: r.invitation_code,
                    specialization: r.specialization,
                    degree: r.degree,
                    academic_rank: r.academic_rank,
                    department: r.department,
                    office: r.office,
                })
                .await?
        }
    };

    let response = RegisterResponse {
        account: AccountResponse::from(&registered.account),
        profile: ProfileResponse::from(&registered.profile),
        instructor_id: registered.instructor.map(|i| i.id),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.identifier, payload.password)
        .await?;

    Ok(Json(token))
}
