//! Remote tagger backend — Hugging Face Inference API.
//!
//! Calls the hosted `dslim/bert-base-NER` model and maps returned character
//! offsets back onto line indices. Retries on 429 and 5xx with exponential
//! backoff; an unreachable or rejecting backend is fatal for the request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::PlainText;
use crate::tagger::{EntityLabel, EntitySpan, EntityTagger, TaggerError};

const INFERENCE_API_URL: &str = "https://api-inference.huggingface.co/models/dslim/bert-base-NER";
const MAX_RETRIES: u32 = 3;
/// Input cap before tagging; keeps requests under the hosted model's limits.
const MAX_INPUT_CHARS: usize = 45_000;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    aggregation_strategy: &'static str,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

/// One aggregated entity as returned by the inference API.
#[derive(Debug, Deserialize)]
struct HfEntity {
    entity_group: String,
    score: f32,
    word: String,
    start: usize,
}

/// NER backend over the Hugging Face Inference API.
#[derive(Clone)]
pub struct RemoteTagger {
    client: Client,
    api_token: String,
}

impl RemoteTagger {
    pub fn new(api_token: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_token,
        }
    }

    async fn call(&self, input: &str) -> Result<Vec<HfEntity>, TaggerError> {
        let request_body = InferenceRequest {
            inputs: input,
            parameters: InferenceParameters {
                aggregation_strategy: "simple",
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let mut last_error: Option<TaggerError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "NER inference attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(INFERENCE_API_URL)
                .bearer_auth(&self.api_token)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(TaggerError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(TaggerError::Unavailable(
                    "inference API rejected the configured token".to_string(),
                ));
            }

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Inference API returned {}: {}", status, body);
                last_error = Some(TaggerError::Unavailable(format!(
                    "inference API returned {status}: {body}"
                )));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TaggerError::Unavailable(format!(
                    "inference API returned {status}: {body}"
                )));
            }

            let entities: Vec<HfEntity> = response.json().await?;
            debug!("NER inference succeeded: {} entities", entities.len());
            return Ok(entities);
        }

        Err(last_error.unwrap_or_else(|| {
            TaggerError::Unavailable(format!("inference API unreachable after {MAX_RETRIES} attempts"))
        }))
    }
}

#[async_trait]
impl EntityTagger for RemoteTagger {
    async fn tag(&self, text: &PlainText) -> Result<Vec<EntitySpan>, TaggerError> {
        if self.api_token.is_empty() {
            return Err(TaggerError::Unavailable(
                "no inference API token configured".to_string(),
            ));
        }

        if text.is_empty() {
            return Ok(Vec::new());
        }

        let joined = text.joined();
        let input = truncate_chars(&joined, MAX_INPUT_CHARS);
        let line_starts = line_start_offsets(input);

        let entities = self.call(input).await?;

        Ok(entities
            .into_iter()
            .map(|e| EntitySpan {
                label: EntityLabel::parse(&e.entity_group),
                confidence: e.score.clamp(0.0, 1.0),
                line: line_for_offset(&line_starts, e.start),
                text: e.word,
            })
            .collect())
    }

    fn backend(&self) -> &'static str {
        "remote-api"
    }
}

/// Truncates to at most `max` characters without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Character offsets at which each line of `text` starts. The inference API
/// reports entity positions in characters, not bytes, so the table must count
/// characters too or multi-byte text shifts every subsequent entity.
fn line_start_offsets(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, c) in text.chars().enumerate() {
        if c == '\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Maps a character offset reported by the model to the line containing it.
fn line_for_offset(line_starts: &[usize], offset: usize) -> usize {
    line_starts.partition_point(|&s| s <= offset).saturating_sub(1)
}
