//! Service container - centralized service access.
//!
//! Depends on service traits, not implementations, so the API layer can
//! be exercised against test doubles.

use std::sync::Arc;

use super::{AuthService, CourseService, EnrollmentService, ProfileService};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(test)]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(test, automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn profiles(&self) -> Arc<dyn ProfileService>;

    fn courses(&self) -> Arc<dyn CourseService>;

    fn enrollments(&self) -> Arc<dyn EnrollmentService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    profile_service: Arc<dyn ProfileService>,
    course_service: Arc<dyn CourseService>,
    enrollment_service: Arc<dyn EnrollmentService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        profile_service: Arc<dyn ProfileService>,
        course_service: Arc<dyn CourseService>,
        enrollment_service: Arc<dyn EnrollmentService>,
    ) -> Self {
        Self {
            auth_service,
            profile_service,
            course_service,
            enrollment_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, CourseManager, EnrollmentManager, ProfileManager};

        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let profile_service = Arc::new(ProfileManager::new(uow.clone()));
        let course_service = Arc::new(CourseManager::new(uow.clone()));
        let enrollment_service = Arc::new(EnrollmentManager::new(uow));

        Self {
            auth_service,
            profile_service,
            course_service,
            enrollment_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileService> {
        self.profile_service.clone()
    }

    fn courses(&self) -> Arc<dyn CourseService> {
        self.course_service.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentService> {
        self.enrollment_service.clone()
    }
}
