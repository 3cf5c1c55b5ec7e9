//! Course Registry - Course enrollment API
//!
//! A REST API for managing accounts with role-based profiles, a course
//! catalog and the enrollment lifecycle, built on Axum and SeaORM.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, repositories)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Load demo data
//! cargo run -- seed
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, Password, Profile, Role};
pub use errors::{AppError, AppResult};
