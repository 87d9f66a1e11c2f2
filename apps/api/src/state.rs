use std::sync::Arc;

use crate::chat::orchestrator::ChatService;
use crate::resume_examples::matcher::ResumeMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything in here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    /// Same corpus handle the chat service matches against; exposed for health reporting.
    pub matcher: Arc<ResumeMatcher>,
}
