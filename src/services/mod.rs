// src/services/mod.rs
//
// External collaborators: the Flask AI backend and the OpenAI API

pub mod openai;
pub mod upstream;

// Re-export commonly used types for convenience
pub use openai::OpenAIService;
pub use upstream::UpstreamService;
