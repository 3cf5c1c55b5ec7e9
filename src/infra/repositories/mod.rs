//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod account_repository;
mod course_repository;
pub(crate) mod entities;
mod enrollment_repository;
mod instructor_repository;
mod profile_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use course_repository::{CourseRepository, CourseStore};
pub use enrollment_repository::{EnrollmentRepository, EnrollmentStore};
pub use instructor_repository::{InstructorRepository, InstructorStore};
pub use profile_repository::{ProfileRepository, ProfileStore};

pub(crate) use account_repository::{find_account_by_id, insert_account};
pub(crate) use course_repository::clear_instructor;
pub(crate) use instructor_repository::{delete_instructor, find_instructor_by_id, insert_instructor};
pub(crate) use profile_repository::{find_profile_by_id, insert_profile};

// Export mocks for unit tests
#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
#[cfg(test)]
pub use instructor_repository::MockInstructorRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
