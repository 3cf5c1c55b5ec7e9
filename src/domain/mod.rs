//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod account;
pub mod course;
pub mod enrollment;
pub mod instructor;
pub mod password;
pub mod profile;

pub use account::{Account, AccountResponse};
pub use course::{Course, CourseLevel};
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use instructor::{Instructor, InstructorResponse};
pub use password::Password;
pub use profile::{
    AdminData, AdminLevel, ContactUpdate, Faculty, Profile, ProfileResponse, Role, RoleDetails,
    StudentData, TeacherData,
};
