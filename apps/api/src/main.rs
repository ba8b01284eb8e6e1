mod admin;
mod analysis;
mod cache;
mod config;
mod db;
mod documents;
mod errors;
mod listings;
mod llm_client;
mod models;
mod query;
mod routes;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{CompatibilityModel, CompatibilityScorer};
use crate::cache::{CacheOrchestrator, CacheStore, DisabledCache, RedisCache};
use crate::config::Config;
use crate::db::create_pool;
use crate::documents::S3DocumentSource;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgRecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting listings API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgRecordStore::new(db));

    // Initialize Redis. Reads and invalidations degrade to no-ops without it.
    let cache: Arc<dyn CacheStore> = match RedisCache::connect(&config.redis_url).await {
        Ok(redis) => Arc::new(redis),
        Err(e) => {
            warn!("Redis unavailable, serving uncached: {e}");
            Arc::new(DisabledCache)
        }
    };

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);
    let documents = Arc::new(S3DocumentSource::new(s3, config.s3_bucket.clone()));

    // Initialize compatibility model
    let model: Option<Arc<dyn CompatibilityModel>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(llm) as Arc<dyn CompatibilityModel>)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, CV analysis will use keyword scoring");
            None
        }
    };

    let state = AppState {
        store,
        cache: CacheOrchestrator::new(cache),
        documents,
        scorer: CompatibilityScorer::new(model),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

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
        "listings-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
