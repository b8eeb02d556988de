// Common module - shared types and utilities across all modules

pub mod error;
pub mod helpers;
pub mod migrations;
pub mod state;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{parse_json_body, safe_email_log, safe_token_log};
pub use state::AppState;
