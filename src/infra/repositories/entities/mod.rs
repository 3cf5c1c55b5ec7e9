//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod account;
pub mod course;
pub mod enrollment;
pub mod instructor;
pub mod profile;
