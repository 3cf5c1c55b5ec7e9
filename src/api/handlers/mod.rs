//! HTTP request handlers

pub mod auth_handler;
pub mod course_handler;
pub mod enrollment_handler;
pub mod profile_handler;

pub use auth_handler::auth_routes;
pub use course_handler::{course_routes, instructor_routes};
pub use enrollment_handler::enrollment_routes;
pub use profile_handler::profile_routes;
