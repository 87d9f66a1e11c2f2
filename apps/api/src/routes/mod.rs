pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::chat::handlers;
use crate::state::AppState;

/// Builds the public router. Resume example files under `examples_dir` are served
/// read-only at `/examples_cv`.
pub fn build_router(state: AppState, examples_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/chat", post(handlers::handle_chat))
        .nest_service("/examples_cv", ServeDir::new(examples_dir))
        .with_state(state)
}
