pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod review;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::config::{AppConfig, ConfigError};
use crate::db::{ComplaintStore, DatabaseError, SqliteComplaintStore};
use crate::pipeline::stages::{AiServiceHttp, ReviewClient, StageError};
use crate::pipeline::{ComplaintPipeline, PipelineStages};
use crate::review::ReviewService;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("AI service client error: {0}")]
    Client(#[from] StageError),

    #[error("Cannot start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("{0}")]
    Server(String),
}

/// Wire the store, collaborator clients and services from configuration.
pub fn build_context(cfg: &AppConfig) -> Result<ApiContext, StartupError> {
    let conn = db::open_database(&cfg.db_path)?;
    let store: Arc<dyn ComplaintStore> = Arc::new(SqliteComplaintStore::new(conn));

    let http = AiServiceHttp::new(&cfg.ai_service_url)?;
    tracing::info!(base_url = http.base_url(), "AI service client ready");
    let pipeline = ComplaintPipeline::new(PipelineStages::http(&http), store.clone(), cfg.timeouts);
    let review = ReviewService::new(
        store.clone(),
        Arc::new(ReviewClient::new(http)),
        cfg.review_timeout,
    );

    Ok(ApiContext {
        pipeline: Arc::new(pipeline),
        review: Arc::new(review),
        store,
        max_complaint_chars: cfg.max_complaint_chars,
    })
}

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cfg = AppConfig::from_env()?;
    tracing::info!(
        bind_addr = %cfg.bind_addr,
        db_path = %cfg.db_path.display(),
        "Configuration loaded"
    );

    // Blocking HTTP clients must be created and dropped outside the runtime.
    let ctx = build_context(&cfg)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;
    let result = runtime.block_on(serve(ctx.clone(), cfg.bind_addr));

    drop(runtime);
    drop(ctx);
    result
}

async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), StartupError> {
    let server = api::start_server(ctx, addr)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(addr = %server.addr(), "Listening; press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown().await;
    Ok(())
}
