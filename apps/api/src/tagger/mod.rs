//! Entity Tagger — pluggable, trait-based NER over extracted resume text.
//!
//! Two backends, selected once at startup and opaque to everything downstream:
//! - `LocalTagger`: deterministic in-process pattern/lexicon tagger.
//! - `RemoteTagger`: Hugging Face Inference API call.
//!
//! `AppState` holds an `Arc<dyn EntityTagger>`, swapped at startup via
//! `NER_BACKEND`. Business logic never branches on the backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::PlainText;

pub mod local;
pub mod remote;

pub use local::LocalTagger;
pub use remote::RemoteTagger;

/// Entity categories the classifier understands. Unrecognized model labels
/// collapse into `Misc` rather than being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Org,
    Date,
    Loc,
    Misc,
}

impl EntityLabel {
    /// Parses a model label such as `PER`, `B-ORG` or `organization`.
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        let norm = upper.trim_start_matches("B-").trim_start_matches("I-");
        if norm.starts_with("PER") {
            EntityLabel::Person
        } else if norm.starts_with("ORG") {
            EntityLabel::Org
        } else if norm.starts_with("DATE") {
            EntityLabel::Date
        } else if norm.starts_with("LOC") {
            EntityLabel::Loc
        } else {
            EntityLabel::Misc
        }
    }
}

/// A single labeled text fragment, positioned by the line it came from.
/// Read-only downstream of the tagger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    /// Model confidence in [0, 1]. The local tagger reports fixed per-rule values.
    pub confidence: f32,
    /// Index into `PlainText::lines`.
    pub line: usize,
}

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The tagger capability: `tag(text) -> spans`, line positions preserved.
///
/// Both backends honor the same contract; a request either gets the full span
/// list or a `TaggerError` — there is no partial tagging.
#[async_trait]
pub trait EntityTagger: Send + Sync {
    async fn tag(&self, text: &PlainText) -> Result<Vec<EntitySpan>, TaggerError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_person_variants() {
        assert_eq!(EntityLabel::parse("PER"), EntityLabel::Person);
        assert_eq!(EntityLabel::parse("B-PER"), EntityLabel::Person);
        assert_eq!(EntityLabel::parse("person"), EntityLabel::Person);
    }

    #[test]
    fn test_label_parse_org_and_date() {
        assert_eq!(EntityLabel::parse("ORG"), EntityLabel::Org);
        assert_eq!(EntityLabel::parse("I-ORG"), EntityLabel::Org);
        assert_eq!(EntityLabel::parse("DATE"), EntityLabel::Date);
    }

    #[test]
    fn test_label_parse_unknown_is_misc() {
        assert_eq!(EntityLabel::parse("GPE"), EntityLabel::Misc);
        assert_eq!(EntityLabel::parse(""), EntityLabel::Misc);
    }
}
