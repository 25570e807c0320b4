use anyhow::{bail, Context, Result};

/// Which NER backend tags entity spans. Selected once at startup;
/// business logic never branches on this — it sees `dyn EntityTagger` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggerBackend {
    Local,
    RemoteApi,
}

impl TaggerBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            TaggerBackend::Local => "local",
            TaggerBackend::RemoteApi => "remote-api",
        }
    }
}

/// Optional S3-compatible storage target for uploaded originals.
/// Present only when all four variables are set.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: TaggerBackend,
    /// Required iff `backend == RemoteApi`.
    pub hf_api_token: Option<String>,
    pub storage: Option<StorageConfig>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend = match std::env::var("NER_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .as_str()
        {
            "local" => TaggerBackend::Local,
            "remote-api" => TaggerBackend::RemoteApi,
            other => bail!("NER_BACKEND must be 'local' or 'remote-api', got '{other}'"),
        };

        let hf_api_token = std::env::var("HF_API_TOKEN").ok().filter(|t| !t.is_empty());
        if backend == TaggerBackend::RemoteApi && hf_api_token.is_none() {
            bail!("HF_API_TOKEN is required when NER_BACKEND=remote-api");
        }

        let storage = match (
            std::env::var("S3_ENDPOINT").ok(),
            std::env::var("S3_BUCKET").ok(),
            std::env::var("AWS_ACCESS_KEY_ID").ok(),
            std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
        ) {
            (Some(endpoint), Some(bucket), Some(access_key_id), Some(secret_access_key)) => {
                Some(StorageConfig {
                    endpoint,
                    bucket,
                    access_key_id,
                    secret_access_key,
                })
            }
            _ => None,
        };

        Ok(Config {
            backend,
            hf_api_token,
            storage,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
