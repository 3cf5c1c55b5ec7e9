//! JWT authentication middleware and role guards.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::Role;
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.sub,
        username: claims.username,
        role: Role::from(claims.role.as_str()),
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Require the given role; admins pass every check.
pub fn require_role(user: &CurrentUser, required: Role) -> Result<(), AppError> {
    if user.role == required || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Staff guard: teachers and admins.
pub fn require_staff(user: &CurrentUser) -> Result<(), AppError> {
    require_role(user, Role::Teacher)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            role,
        }
    }

    #[test]
    fn admin_passes_every_guard() {
        let admin = user(Role::Admin);
        assert!(require_admin(&admin).is_ok());
        assert!(require_role(&admin, Role::Student).is_ok());
        assert!(require_staff(&admin).is_ok());
    }

    #[test]
    fn student_fails_staff_guard() {
        let student = user(Role::Student);
        assert!(require_staff(&student).is_err());
        assert!(require_role(&student, Role::Student).is_ok());
    }
}
