mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod uploads;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::build_model_client;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemorySubmissionStore, PgSubmissionStore, SubmissionStore};
use crate::uploads::UploadStore;
use crate::validation::pipeline::ValidationPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvcheck v{}", env!("CARGO_PKG_VERSION"));

    // Initialize submission store
    let store: Arc<dyn SubmissionStore> = match &config.database_url {
        Some(url) => Arc::new(PgSubmissionStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; submissions are kept in memory and lost on restart");
            Arc::new(MemorySubmissionStore::new())
        }
    };

    // Initialize model client
    let model = build_model_client(&config)?;
    info!(
        "Model client initialized (provider: {}, model: {}, timeout: {}s, retries: {})",
        config.model_provider.as_str(),
        model.model(),
        config.model_timeout.as_secs(),
        config.model_max_retries
    );

    let uploads = UploadStore::new(&config.upload_dir, &config.public_base_url);
    tokio::fs::create_dir_all(uploads.dir()).await?;
    info!("Uploads stored in {}", uploads.dir().display());

    // Build app state
    let state = AppState {
        pipeline: ValidationPipeline::new(store.clone(), model, config.model_timeout),
        store,
        uploads,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the form's host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
