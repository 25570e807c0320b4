//! Local tagger backend — deterministic pattern/lexicon NER.
//!
//! No ML runtime is embedded: this backend promotes the heuristics the service
//! would otherwise fall back on into a first-class tagger satisfying the same
//! `tag(text) -> spans` contract as the remote model. Fully deterministic, so
//! identical input always yields identical spans.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::PlainText;
use crate::tagger::{EntityLabel, EntitySpan, EntityTagger, TaggerError};

/// Year ranges like `2021-2024`, `2019 – present`, `2020 to 2022`.
static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(19|20)\d{2}\s*(?:[-–—]|to)\s*(?:(19|20)\d{2}|present|now|current)\b")
        .expect("valid date range regex")
});

/// Bare years, for lines without an explicit range.
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex"));

/// Capitalized token runs ending in a corporate/institutional suffix.
static ORG_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][\w&.-]*(?:\s+[A-Z][\w&.-]*)*\s+(?:Corp(?:oration)?|Inc|Ltd|LLC|GmbH|Technologies|Labs|Systems|Solutions|Group|University|College|Institute|School)\b\.?)",
    )
    .expect("valid org suffix regex")
});

/// Capitalized token runs introduced by `at` (e.g. `Engineer at ABC Corp`).
static ORG_AT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bat\s+([A-Z][\w&.-]*(?:\s+[A-Z][\w&.-]*)*)").expect("valid org-at regex")
});

/// A line that is plausibly just a person's name: 2-4 capitalized words,
/// letters only. Checked near the top of the document.
static NAME_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z'.-]+){1,3}$").expect("valid name line regex")
});

/// How far down the document the name is still looked for.
const NAME_SEARCH_LINES: usize = 5;

const NAME_CONFIDENCE: f32 = 0.90;
const ORG_CONFIDENCE: f32 = 0.85;
const DATE_CONFIDENCE: f32 = 0.95;

/// Deterministic pattern-based tagger. Constructed once at startup and shared
/// read-only across requests; `tag` takes `&self` and mutates nothing.
#[derive(Debug, Default)]
pub struct LocalTagger;

impl LocalTagger {
    pub fn new() -> Self {
        Self
    }

    fn tag_line(line_idx: usize, line: &str, spans: &mut Vec<EntitySpan>) {
        // Date ranges first, then bare years that fall outside any range.
        let mut date_ranges: Vec<(usize, usize)> = Vec::new();
        for m in DATE_RANGE_RE.find_iter(line) {
            date_ranges.push((m.start(), m.end()));
            spans.push(EntitySpan {
                text: m.as_str().to_string(),
                label: EntityLabel::Date,
                confidence: DATE_CONFIDENCE,
                line: line_idx,
            });
        }
        for m in YEAR_RE.find_iter(line) {
            let covered = date_ranges
                .iter()
                .any(|&(s, e)| m.start() >= s && m.end() <= e);
            if !covered {
                spans.push(EntitySpan {
                    text: m.as_str().to_string(),
                    label: EntityLabel::Date,
                    confidence: DATE_CONFIDENCE,
                    line: line_idx,
                });
            }
        }

        // Organizations: suffix matches win over `at X` matches on overlap.
        let mut org_ranges: Vec<(usize, usize)> = Vec::new();
        for m in ORG_SUFFIX_RE.find_iter(line) {
            org_ranges.push((m.start(), m.end()));
            spans.push(EntitySpan {
                text: m.as_str().trim_end_matches('.').to_string(),
                label: EntityLabel::Org,
                confidence: ORG_CONFIDENCE,
                line: line_idx,
            });
        }
        for cap in ORG_AT_RE.captures_iter(line) {
            if let Some(m) = cap.get(1) {
                let overlaps = org_ranges.iter().any(|&(s, e)| m.start() < e && m.end() > s);
                if !overlaps {
                    spans.push(EntitySpan {
                        text: m.as_str().to_string(),
                        label: EntityLabel::Org,
                        confidence: ORG_CONFIDENCE,
                        line: line_idx,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl EntityTagger for LocalTagger {
    async fn tag(&self, text: &PlainText) -> Result<Vec<EntitySpan>, TaggerError> {
        let mut spans = Vec::new();

        // Name: first plausible name line among the top non-empty lines.
        for (idx, line) in text
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .take(NAME_SEARCH_LINES)
        {
            let trimmed = line.trim();
            if NAME_LINE_RE.is_match(trimmed) {
                spans.push(EntitySpan {
                    text: trimmed.to_string(),
                    label: EntityLabel::Person,
                    confidence: NAME_CONFIDENCE,
                    line: idx,
                });
                break;
            }
        }

        for (idx, line) in text.lines().iter().enumerate() {
            Self::tag_line(idx, line, &mut spans);
        }

        Ok(spans)
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
