//! Shared types reused across the API surface.

mod pagination;

pub use pagination::{Paginated, PaginationMeta, PaginationParams};
