mod auth;
mod config;
mod errors;
mod gateway;
mod history;
mod llm_client;
mod matching;
mod models;
mod optimize;
mod profile;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::IdentityStore;
use crate::config::Config;
use crate::gateway::LlmGateway;
use crate::history::HistoryArchive;
use crate::llm_client::LlmClient;
use crate::matching::progress::ProgressChannel;
use crate::matching::session::MatchSession;
use crate::optimize::OptimizationRegistry;
use crate::profile::ProfileStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the persistence port and read both durable slots once.
    let store = Arc::new(JsonFileStore::new(&config.data_dir)?);
    let history = Arc::new(HistoryArchive::load(store.clone())?);
    let identity = Arc::new(IdentityStore::load(store)?);
    info!("State store ready at {}", config.data_dir.display());

    // Initialize LLM client and the gateway over it
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    if llm.has_credential() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        info!("LLM client initialized WITHOUT a credential; AI calls will fail until ANTHROPIC_API_KEY is set");
    }
    let intel = Arc::new(LlmGateway::new(llm));

    // Progress narration: an independent consumer of the phase-transition
    // channel. The pipeline works identically if this task never runs.
    let progress = ProgressChannel::new();
    let mut narration = progress.subscribe();
    tokio::spawn(async move {
        while let Ok(update) = narration.recv().await {
            info!("[{:?}] {}", update.phase, update.detail);
        }
    });

    // Build app state
    let state = AppState {
        intel,
        profile: Arc::new(ProfileStore::default()),
        session: Arc::new(Mutex::new(MatchSession::default())),
        optimizations: OptimizationRegistry::default(),
        history,
        identity,
        progress,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
