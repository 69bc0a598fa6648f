mod auth;
mod config;
mod errors;
mod export;
mod llm_client;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::IdentityClient;
use crate::config::Config;
use crate::export::document::HttpDocumentWriter;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HSM API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation backend client
    let llm = LlmClient::new(
        config.generation_api_url.clone(),
        config.generation_api_key.clone(),
    );
    info!("Generation client initialized");

    // Initialize identity provider client
    let identity = IdentityClient::new(config.identity_api_url.clone());
    info!("Identity client initialized");

    // Initialize document renderer collaborator
    let doc_writer = Arc::new(HttpDocumentWriter::new(config.doc_render_url.clone()));
    info!("Document writer initialized");

    // Build app state
    let state = AppState {
        llm,
        identity,
        doc_writer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
