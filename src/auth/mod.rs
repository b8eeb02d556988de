//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google ID-token verification
//! - Password sign-up/sign-in
//! - Session token issuing and verification
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod google;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod token;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use routes::auth_routes;
pub use token::TokenService;
