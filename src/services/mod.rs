//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
pub mod container;
mod course_service;
mod enrollment_service;
mod profile_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, Authenticator, Claims, Registered, StudentRegistration, TeacherRegistration,
    TokenResponse,
};
pub use course_service::{
    slugify, CourseManager, CourseService, CourseUpdate, CourseWithStats, NewCourse,
};
pub use enrollment_service::{EnrollmentManager, EnrollmentService};
pub use profile_service::{ProfileManager, ProfileService};

#[cfg(test)]
pub use container::MockServiceContainer;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests;
