// Application state shared across all modules

use std::sync::Arc;

use crate::auth::google::GoogleVerifier;
use crate::auth::token::TokenService;
use crate::services::{OpenAIService, UpstreamService};
use crate::users::UserDirectory;

/// Application state containing the domain services and configuration.
/// The sqlite pool and HTTP client live inside the services that use them.
/// Every field is read-only after startup; handlers receive it through an
/// `Extension<Arc<RwLock<AppState>>>`.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub google: GoogleVerifier,
    pub directory: UserDirectory,
    pub upstream: UpstreamService,
    pub openai: Arc<OpenAIService>,
    pub roadmap_language: String,
}
