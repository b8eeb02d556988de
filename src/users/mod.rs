//! # Users Module
//!
//! Single-table user directory keyed by external identity id, plus the
//! onboarding persistence route.

pub mod directory;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use directory::{DirectoryError, UserDirectory};
pub use models::User;
pub use routes::users_routes;
