use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::config::Config;
use crate::tagger::EntityTagger;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable NER backend, loaded once at startup and read-only thereafter.
    /// Swap via `NER_BACKEND`.
    pub tagger: Arc<dyn EntityTagger>,
    /// Present only when blob storage is configured.
    pub s3: Option<S3Client>,
    pub config: Config,
}
