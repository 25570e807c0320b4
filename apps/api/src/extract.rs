//! Extraction pipeline and upload handler.
//!
//! Each request flows linearly: validate -> extract text -> tag entities ->
//! classify sections -> assemble schema, with an optional storage upload of
//! the original bytes on the side. No state persists across requests.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::{self, DocumentFormat, RawDocument};
use crate::errors::AppError;
use crate::sections;
use crate::sections::schema::StructuredFields;
use crate::state::AppState;
use crate::storage;
use crate::tagger::{EntityTagger, TaggerError};

/// Response payload: the structured fields, plus a storage reference when the
/// upload side-channel is configured and succeeded.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub fields: StructuredFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// POST /api/v1/resumes/extract
///
/// Accepts a multipart upload with a `file` field (PDF or DOCX) and returns
/// the assembled resume schema.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let doc = read_upload(&mut multipart).await?;
    info!(
        filename = %doc.filename,
        size = doc.bytes.len(),
        "Received resume upload"
    );

    let fields = run_pipeline(&doc, state.tagger.as_ref()).await?;

    // Optional side-channel: upload failures are logged and never fail the
    // extraction response.
    let file_url = match (&state.s3, &state.config.storage) {
        (Some(s3), Some(cfg)) => {
            match storage::send(s3, cfg, doc.bytes.clone(), &doc.filename, doc.format).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Storage upload failed, omitting file_url: {e}");
                    None
                }
            }
        }
        _ => None,
    };

    Ok(Json(ExtractResponse { fields, file_url }))
}

/// Runs the extraction pipeline over one document.
pub async fn run_pipeline(
    doc: &RawDocument,
    tagger: &dyn EntityTagger,
) -> Result<StructuredFields, AppError> {
    let text = document::extract_text(doc).await?;
    debug!(lines = text.lines().len(), "Extracted text");

    // Any tagger failure is fatal for the request; there is no partial tagging.
    let spans = tagger
        .tag(&text)
        .await
        .map_err(|e: TaggerError| AppError::ModelUnavailable(e.to_string()))?;
    debug!(
        spans = spans.len(),
        backend = tagger.backend(),
        "Tagged entity spans"
    );

    Ok(sections::assemble(sections::classify(&text, &spans)))
}

/// Pulls the `file` field out of the multipart body and validates its format.
async fn read_upload(multipart: &mut Multipart) -> Result<RawDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::Validation("file field is missing a filename".to_string()))?
            .to_string();
        let format = DocumentFormat::from_filename(&filename)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        return Ok(RawDocument {
            bytes,
            format,
            filename,
        });
    }

    Err(AppError::Validation(
        "multipart body must contain a 'file' field".to_string(),
    ))
}
