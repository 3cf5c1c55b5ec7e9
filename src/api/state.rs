//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AuthService, CourseService, EnrollmentService, ProfileService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
///
/// Use `from_config()` for recommended initialization with full
/// ServiceContainer and UnitOfWork support.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub profile_service: Arc<dyn ProfileService>,
    pub course_service: Arc<dyn CourseService>,
    pub enrollment_service: Arc<dyn EnrollmentService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Internal service container (optional, only with from_config)
    service_container: Option<Arc<Services>>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// This is the recommended way to create AppState as it uses
    /// the ServiceContainer for centralized service management.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));

        Self {
            auth_service: container.auth(),
            profile_service: container.profiles(),
            course_service: container.courses(),
            enrollment_service: container.enrollments(),
            database,
            service_container: Some(container),
        }
    }

    /// Create new application state with manually injected services.
    ///
    /// Note: This method does not provide ServiceContainer access.
    /// Use `from_config()` for full functionality.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        profile_service: Arc<dyn ProfileService>,
        course_service: Arc<dyn CourseService>,
        enrollment_service: Arc<dyn EnrollmentService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            profile_service,
            course_service,
            enrollment_service,
            database,
            service_container: None,
        }
    }

    /// Get the service container for centralized service access.
    ///
    /// Returns `Some` only if created via `from_config()`.
    pub fn services(&self) -> Option<&Arc<Services>> {
        self.service_container.as_ref()
    }
}
