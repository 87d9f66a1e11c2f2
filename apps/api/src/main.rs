mod chat;
mod config;
mod errors;
mod inference;
mod models;
mod resume_examples;
mod routes;
mod state;
mod translation;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::orchestrator::{ChatService, ChatSettings};
use crate::config::Config;
use crate::errors::StartupError;
use crate::inference::{InferenceClient, PollPolicy};
use crate::resume_examples::corpus::load_corpus;
use crate::resume_examples::matcher::ResumeMatcher;
use crate::routes::build_router;
use crate::state::AppState;
use crate::translation::DeepLClient;

/// Upper bound for any single outbound HTTP call (one translation, one submit, one poll).
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume chat API v{}", env!("CARGO_PKG_VERSION"));

    // Load the resume corpus once; it is never reloaded
    let examples = load_corpus(Path::new(&config.corpus_path)).map_err(StartupError::from)?;
    let matcher = Arc::new(ResumeMatcher::new(examples, config.matching.clone()));
    info!(
        "Resume matcher ready ({} examples, threshold {})",
        matcher.len(),
        config.matching.threshold
    );

    // Outbound clients share one connection pool
    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let translator = Arc::new(DeepLClient::new(
        http.clone(),
        config.deepl_api_url.clone(),
        config.deepl_api_key.clone(),
    ));

    let poll = PollPolicy::from(&config.generation);
    info!(
        "Inference client: {} (poll every {:?}, max {} attempts)",
        config.runpod_base_url, poll.interval, poll.max_attempts
    );
    let generator = Arc::new(InferenceClient::new(
        http,
        config.runpod_base_url.clone(),
        config.runpod_api_key.clone(),
        poll,
    ));

    let chat = Arc::new(ChatService::new(
        translator,
        generator,
        matcher.clone(),
        ChatSettings::from(&config),
    ));

    let state = AppState { chat, matcher };

    // Build router
    let app = build_router(state, &config.examples_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
