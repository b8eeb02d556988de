//! # Relay Module
//!
//! Forwards authenticated AI requests to the external backend and builds
//! roadmap generations from the chat-completions API.

pub mod handlers;
pub mod routes;


pub use routes::relay_routes;
