mod config;
mod document;
mod errors;
mod extract;
mod routes;
mod sections;
mod state;
mod storage;
mod tagger;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, TaggerBackend};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tagger::{EntityTagger, LocalTagger, RemoteTagger};

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

    info!(
        "Starting resume extractor API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Build the NER backend once; it is read-only for the process lifetime.
    let tagger: Arc<dyn EntityTagger> = match config.backend {
        TaggerBackend::Local => Arc::new(LocalTagger::new()),
        TaggerBackend::RemoteApi => Arc::new(RemoteTagger::new(
            config
                .hf_api_token
                .clone()
                .expect("validated by Config::from_env"),
        )),
    };
    info!("NER backend initialized: {}", tagger.backend());

    // Initialize S3 / MinIO when storage is configured
    let s3 = match &config.storage {
        Some(storage) => {
            let client = storage::build_s3_client(storage).await;
            info!("S3 client initialized (bucket: {})", storage.bucket);
            Some(client)
        }
        None => {
            info!("No storage configured, upload side-channel disabled");
            None
        }
    };

    // Build app state
    let state = AppState {
        tagger,
        s3,
        config: config.clone(),
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
