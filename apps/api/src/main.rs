mod chains;
mod config;
mod db;
mod errors;
mod extraction;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod tokens;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chains::Chains;
use crate::config::Config;
use crate::db::create_pool;
use crate::interview::engine::InterviewEngine;
use crate::llm_client::cache::ResponseCache;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgInterviewStore;
use crate::tokens::JwtTokenIssuer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Inquisitor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let mut llm = LlmClient::new(config.anthropic_api_key.clone());
    if config.cache_enabled {
        llm = llm.with_cache(ResponseCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_max_entries,
        ));
        info!("LLM response cache enabled (ttl {}s)", config.cache_ttl_secs);
    }
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Wire the engine: chains over the LLM client, the Postgres-backed
    // store, and JWT candidate tokens.
    let chains = Arc::new(Chains::new(
        Arc::new(llm),
        Duration::from_secs(config.chain_timeout_secs),
    ));
    let store = Arc::new(PgInterviewStore::new(db));
    let tokens = Arc::new(JwtTokenIssuer::new(
        &config.token_secret,
        config.token_ttl_hours,
    ));
    let engine = Arc::new(InterviewEngine::new(
        store,
        chains,
        tokens,
        config.tuning(),
    ));

    let state = AppState { engine };

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
