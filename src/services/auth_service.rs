//! Authentication service - registration and login.
//!
//! Registration is role-aware: the student path is open, the teacher
//! path is gated by an invitation code and additionally provisions an
//! instructor record. Each compound create runs inside one transaction
//! so a failure leaves nothing behind.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, DEFAULT_YEAR_OF_STUDY, MIN_PASSWORD_LENGTH, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{
    Account, Faculty, Instructor, Password, Profile, Role, RoleDetails, StudentData, TeacherData,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Student self-service registration input
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub faculty: Faculty,
    pub year_of_study: Option<u8>,
    pub student_card: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Invitation-gated teacher registration input
#[derive(Debug, Clone)]
pub struct TeacherRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub invitation_code: String,
    pub specialization: String,
    pub degree: Option<String>,
    pub academic_rank: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
}

/// Outcome of a successful registration
#[derive(Debug)]
pub struct Registered {
    pub account: Account,
    pub profile: Profile,
    /// Present on the teacher path only
    pub instructor: Option<Instructor>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a student account with its profile.
    async fn register_student(&self, input: StudentRegistration) -> AppResult<Registered>;

    /// Register a teacher account with its profile and instructor record.
    /// Requires the configured invitation code.
    async fn register_teacher(&self, input: TeacherRegistration) -> AppResult<Registered>;

    /// Login by username or email and return a JWT token.
    async fn login(&self, identifier: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for an account (shared helper to avoid duplication)
fn generate_token(account: &Account, role: Role, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: account.id,
        username: account.username.clone(),
        role: role.as_str().to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    /// Password policy checks shared by both registration paths.
    ///
    /// Weakness is reported before mismatch so a user fixing a short
    /// password learns about it first.
    fn check_password(password: &str, confirm: &str) -> AppResult<()> {
        if (password.chars().count() as u64) < MIN_PASSWORD_LENGTH {
            return Err(AppError::WeakPassword);
        }
        if password != confirm {
            return Err(AppError::PasswordMismatch);
        }
        Ok(())
    }

    /// Duplicate pre-check. The unique constraints remain the source of
    /// truth; this just gives most callers a fast, clean answer.
    async fn check_duplicates(&self, username: &str, email: &str) -> AppResult<()> {
        if self.uow.accounts().find_by_username(username).await?.is_some()
            || self.uow.accounts().find_by_email(email).await?.is_some()
        {
            return Err(AppError::DuplicateAccount);
        }
        Ok(())
    }

    fn build_account(
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
    ) -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name,
            last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn build_profile(account_id: Uuid, details: RoleDetails) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            account_id,
            avatar: None,
            phone: None,
            bio: None,
            details,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register_student(&self, input: StudentRegistration) -> AppResult<Registered> {
        Self::check_password(&input.password, &input.password_confirm)?;
        self.check_duplicates(&input.username, &input.email).await?;

        let password_hash = Password::new(&input.password)?.into_string();
        let account = Self::build_account(
            input.username,
            input.email,
            password_hash,
            input.first_name,
            input.last_name,
        );
        let details = RoleDetails::Student(StudentData {
            student_id: input.student_card,
            birth_date: input.birth_date,
            faculty: input.faculty,
            year_of_study: input.year_of_study.unwrap_or(DEFAULT_YEAR_OF_STUDY),
        });
        let profile = Self::build_profile(account.id, details);

        let (account, profile) = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let account = ctx.accounts().create(account).await?;
                    let profile = ctx.profiles().create(profile).await?;
                    Ok((account, profile))
                })
            })
            .await?;

        tracing::info!(account_id = %account.id, "registered student account");

        Ok(Registered {
            account,
            profile,
            instructor: None,
        })
    }

    async fn register_teacher(&self, input: TeacherRegistration) -> AppResult<Registered> {
        Self::check_password(&input.password, &input.password_confirm)?;

        if input.invitation_code != self.config.teacher_invitation_code {
            return Err(AppError::InvalidInvitationCode);
        }

        self.check_duplicates(&input.username, &input.email).await?;

        let password_hash = Password::new(&input.password)?.into_string();
        let account = Self::build_account(
            input.username,
            input.email,
            password_hash,
            input.first_name,
            input.last_name,
        );
        let details = RoleDetails::Teacher(TeacherData {
            specialization: input.specialization,
            degree: input.degree.unwrap_or_default(),
            academic_rank: input.academic_rank.unwrap_or_default(),
            department: input.department.unwrap_or_default(),
            office: input.office.unwrap_or_default(),
        });
        let profile = Self::build_profile(account.id, details);

        let now = Utc::now();
        let instructor = Instructor {
            id: Uuid::new_v4(),
            profile_id: profile.id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let (account, profile, instructor) = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let account = ctx.accounts().create(account).await?;
                    let profile = ctx.profiles().create(profile).await?;
                    let instructor = ctx.instructors().create(instructor).await?;
                    Ok((account, profile, instructor))
                })
            })
            .await?;

        tracing::info!(account_id = %account.id, "registered teacher account");

        Ok(Registered {
            account,
            profile,
            instructor: Some(instructor),
        })
    }

    async fn login(&self, identifier: String, password: String) -> AppResult<TokenResponse> {
        let account = self.uow.accounts().find_by_identifier(&identifier).await?;

        // SECURITY: Perform password verification even if the account
        // doesn't exist to prevent timing attacks that could enumerate
        // valid usernames. The dummy hash always fails verification.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, account_exists) = match &account {
            Some(account) => (account.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        if !account_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let account = account.as_ref().unwrap();
        if !account.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let profile = self
            .uow
            .profiles()
            .find_by_account(account.id)
            .await?
            .ok_or_else(|| AppError::internal("Account has no profile"))?;

        generate_token(account, profile.role(), &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
