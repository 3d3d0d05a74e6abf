mod agent;
mod applications;
mod cache;
mod config;
mod db;
mod documents;
mod errors;
mod extraction;
mod lightcast;
mod llm_client;
mod models;
mod refactor;
mod research;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::Cache;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::documents::store::S3DocumentStore;
use crate::lightcast::LightcastClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Linkivo API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize Redis-backed cache (falls back to memory when Redis is down)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Cache::new(redis, Duration::from_secs(config.cache_ttl_secs));
    info!("Cache initialized (ttl: {}s)", config.cache_ttl_secs);

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let documents = Arc::new(S3DocumentStore::new(s3, config.s3_bucket.clone()));
    info!("S3 document store initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openrouter_api_key.clone(),
        config.openrouter_base_url.clone(),
        config.llm_model.clone(),
        config.feedback_model.clone(),
    )?;
    info!(
        "LLM client initialized (model: {}, feedback model: {})",
        config.llm_model, config.feedback_model
    );

    let lightcast = LightcastClient::new(config.lightcast.clone())?;
    if !lightcast.is_configured() {
        info!("Lightcast credentials not set; skill search will return 502");
    }

    // Build app state
    let state = AppState {
        db,
        cache,
        documents,
        llm: Arc::new(llm),
        lightcast: Arc::new(lightcast),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the frontend host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "linkivo-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::from_conf(
        aws_sdk_s3::config::Builder::from(&s3_config)
            .force_path_style(true)
            .build(),
    )
}
