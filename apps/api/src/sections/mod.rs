//! Section Classifier — buckets tagged spans and heuristically-matched lines
//! into resume sections, then assembles the fixed output schema.
//!
//! Classification is additive only: an assignment is never retracted within a
//! pass. Entity rules run alongside the keyword rule table; lines the tagger
//! left unlabeled still get bucketed by line heuristics.

pub mod rules;
pub mod schema;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::PlainText;
use crate::sections::rules::{
    classify_line, rule_index, RuleMatch, Section, BULLET_RE, HOBBY_VOCAB, SKILLS_VOCAB,
};
use crate::sections::schema::{EducationSection, ExperienceSection, StructuredFields};
use crate::tagger::{EntityLabel, EntitySpan};

/// Up to this many ORG spans become education fallback entries.
const EDUCATION_ORG_FALLBACK: usize = 3;
/// Up to this many ORG spans become short experience mentions.
const EXPERIENCE_ORG_MENTIONS: usize = 5;
/// Minimum length for a line to qualify as the introduction.
const INTRO_MIN_CHARS: usize = 30;
/// Matched education lines shorter than this are noise.
const EDUCATION_MIN_CHARS: usize = 5;

/// Whole-word patterns for each vocabulary term, compiled once. Terms carry
/// regex metacharacters (`c++`), so each is escaped; `+` and `#` count as
/// word characters so `c` does not match inside `c++`.
static SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| compile_vocab(SKILLS_VOCAB));
static HOBBY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| compile_vocab(HOBBY_VOCAB));

fn compile_vocab(vocab: &[&'static str]) -> Vec<(&'static str, Regex)> {
    vocab
        .iter()
        .map(|term| {
            let pattern = format!(r"(^|[^\w+#]){}($|[^\w+#])", regex::escape(term));
            (
                *term,
                Regex::new(&pattern).expect("vocabulary terms compile"),
            )
        })
        .collect()
}

/// Per-section accumulators, built incrementally by the classifier.
/// `skills` is a sorted set so output order is stable regardless of match order.
#[derive(Debug, Clone, Default)]
pub struct ResumeSections {
    pub name: Option<String>,
    pub introduction: Option<String>,
    pub education_entries: Vec<String>,
    pub experience_lines: Vec<String>,
    pub skills: BTreeSet<String>,
    pub certifications: Vec<String>,
    pub projects: Vec<String>,
    pub hobbies: Vec<String>,
}

/// Runs label rules and line heuristics over the document in one pass.
pub fn classify(text: &PlainText, spans: &[EntitySpan]) -> ResumeSections {
    let mut sections = ResumeSections::default();

    // Name: first PERSON span wins.
    sections.name = spans
        .iter()
        .find(|s| s.label == EntityLabel::Person)
        .map(|s| s.text.clone());

    let orgs: Vec<&EntitySpan> = spans
        .iter()
        .filter(|s| s.label == EntityLabel::Org)
        .collect();

    for (idx, line) in text.lines().iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Introduction: first sufficiently long line.
        if sections.introduction.is_none() && trimmed.len() > INTRO_MIN_CHARS {
            sections.introduction = Some(trimmed.to_string());
        }

        let stripped = BULLET_RE.replace(trimmed, "");
        let lower = stripped.to_lowercase();

        match winning_rule(&lower, idx, spans) {
            Some(RuleMatch {
                section: Section::Education,
                ..
            }) => {
                if trimmed.len() > EDUCATION_MIN_CHARS {
                    sections.education_entries.push(trimmed.to_string());
                }
            }
            Some(RuleMatch {
                section: Section::Experience,
                ..
            }) => sections.experience_lines.push(trimmed.to_string()),
            Some(RuleMatch {
                section: Section::Certifications,
                ..
            }) => sections.certifications.push(trimmed.to_string()),
            Some(RuleMatch {
                section: Section::Projects,
                ..
            }) => sections.projects.push(trimmed.to_string()),
            None => {}
        }
    }

    // Vocabulary scans over the whole document.
    let lower_text = text.joined().to_lowercase();
    for (skill, pattern) in SKILL_PATTERNS.iter() {
        if pattern.is_match(&lower_text) {
            sections.skills.insert((*skill).to_string());
        }
    }
    for (hobby, pattern) in HOBBY_PATTERNS.iter() {
        if pattern.is_match(&lower_text) {
            sections.hobbies.push((*hobby).to_string());
        }
    }

    // MISC spans the model tagged that name a known skill.
    for span in spans.iter().filter(|s| s.label == EntityLabel::Misc) {
        let lower_span = span.text.to_lowercase();
        if SKILLS_VOCAB.contains(&lower_span.as_str()) {
            sections.skills.insert(lower_span);
        }
    }

    // Education fallback: no matched line, but the tagger found organizations.
    if sections.education_entries.is_empty() {
        sections.education_entries.extend(
            orgs.iter()
                .take(EDUCATION_ORG_FALLBACK)
                .map(|s| s.text.clone()),
        );
    }

    // Short ORG mentions supplement the experience lines.
    let mut seen_orgs: Vec<&str> = Vec::new();
    for org in &orgs {
        if seen_orgs.contains(&org.text.as_str()) {
            continue;
        }
        seen_orgs.push(&org.text);
        if seen_orgs.len() > EXPERIENCE_ORG_MENTIONS {
            break;
        }
        sections
            .experience_lines
            .push(format!("Worked at {}", org.text));
    }

    sections
}

/// Applies the keyword rule table plus the ORG+DATE entity rule to one line,
/// returning the winner under the earliest-trigger tie-break.
fn winning_rule(lower_line: &str, line_idx: usize, spans: &[EntitySpan]) -> Option<RuleMatch> {
    let mut best = classify_line(lower_line);

    // Entity rule: ORG and DATE co-occurring on a line is an experience
    // trigger positioned at the ORG mention. Same (position, table order)
    // comparison as keyword triggers, at the Experience rule's table priority.
    let org = spans
        .iter()
        .find(|s| s.line == line_idx && s.label == EntityLabel::Org);
    let has_date = spans
        .iter()
        .any(|s| s.line == line_idx && s.label == EntityLabel::Date);
    if let (Some(org), true) = (org, has_date) {
        let position = lower_line.find(&org.text.to_lowercase()).unwrap_or(0);
        let candidate = RuleMatch {
            position,
            rule_index: rule_index(Section::Experience).unwrap_or(usize::MAX),
            section: Section::Experience,
        };
        let better = match best {
            None => true,
            Some(b) => (candidate.position, candidate.rule_index) < (b.position, b.rule_index),
        };
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Response Assembler — merges accumulated sections into the fixed schema,
/// filling every unmatched key with its type-appropriate empty default.
pub fn assemble(sections: ResumeSections) -> StructuredFields {
    StructuredFields {
        name: sections.name.unwrap_or_default(),
        introduction: sections.introduction.unwrap_or_default(),
        education: EducationSection {
            entries: sections.education_entries,
        },
        experience: ExperienceSection {
            summary_lines: sections.experience_lines,
        },
        skills: sections.skills.into_iter().collect(),
        certifications: sections.certifications,
        projects: sections.projects,
        hobbies: sections.hobbies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, label: EntityLabel, line: usize) -> EntitySpan {
        EntitySpan {
            text: text.to_string(),
            label,
            confidence: 0.9,
            line,
        }
    }

    #[test]
    fn test_org_and_date_on_same_line_goes_to_experience() {
        let text = PlainText::from_text("Software Engineer at ABC Corp (2021-2024)");
        let spans = vec![
            span("ABC Corp", EntityLabel::Org, 0),
            span("2021-2024", EntityLabel::Date, 0),
        ];
        let fields = assemble(classify(&text, &spans));
        assert!(fields
            .experience
            .summary_lines
            .contains(&"Software Engineer at ABC Corp (2021-2024)".to_string()));
    }

    #[test]
    fn test_org_inside_education_line_prefers_education() {
        // "BSc" fires at position 0, before the ORG mention — education wins
        // even though ORG+DATE co-occur on the line.
        let text = PlainText::from_text("BSc Computer Science, Stanford University, 2018");
        let spans = vec![
            span("Stanford University", EntityLabel::Org, 0),
            span("2018", EntityLabel::Date, 0),
        ];
        let fields = assemble(classify(&text, &spans));
        assert_eq!(
            fields.education.entries,
            vec!["BSc Computer Science, Stanford University, 2018"]
        );
    }

    #[test]
    fn test_first_person_span_becomes_name() {
        let text = PlainText::from_text("Jane Doe\nSome header");
        let spans = vec![
            span("Jane Doe", EntityLabel::Person, 0),
            span("John Smith", EntityLabel::Person, 1),
        ];
        let fields = assemble(classify(&text, &spans));
        assert_eq!(fields.name, "Jane Doe");
    }

    #[test]
    fn test_skills_vocabulary_scan_is_sorted_and_deduped() {
        let text = PlainText::from_text("Worked with Python, docker and PYTHON again.\n- rust");
        let fields = assemble(classify(&text, &[]));
        assert_eq!(fields.skills, vec!["docker", "python", "rust"]);
    }

    #[test]
    fn test_cpp_skill_matches_despite_metacharacters() {
        let text = PlainText::from_text("Languages: C++ and Java");
        let fields = assemble(classify(&text, &[]));
        assert!(fields.skills.contains(&"c++".to_string()));
        assert!(fields.skills.contains(&"java".to_string()));
    }

    #[test]
    fn test_misc_span_matching_vocab_counts_as_skill() {
        let text = PlainText::from_text("Built services");
        let spans = vec![span("Kubernetes", EntityLabel::Misc, 0)];
        let fields = assemble(classify(&text, &spans));
        assert_eq!(fields.skills, vec!["kubernetes"]);
    }

    #[test]
    fn test_education_falls_back_to_org_spans() {
        let text = PlainText::from_text("just some text without degree lines");
        let spans = vec![
            span("Acme Corp", EntityLabel::Org, 0),
            span("Beta LLC", EntityLabel::Org, 0),
        ];
        let fields = assemble(classify(&text, &spans));
        assert_eq!(fields.education.entries, vec!["Acme Corp", "Beta LLC"]);
    }

    #[test]
    fn test_org_mentions_added_as_experience_lines() {
        let text = PlainText::from_text("plain line");
        let spans = vec![span("Acme Corp", EntityLabel::Org, 0)];
        let fields = assemble(classify(&text, &spans));
        assert!(fields
            .experience
            .summary_lines
            .contains(&"Worked at Acme Corp".to_string()));
    }

    #[test]
    fn test_duplicate_orgs_mentioned_once() {
        let text = PlainText::from_text("a\nb");
        let spans = vec![
            span("Acme Corp", EntityLabel::Org, 0),
            span("Acme Corp", EntityLabel::Org, 1),
        ];
        let fields = assemble(classify(&text, &spans));
        let mentions = fields
            .experience
            .summary_lines
            .iter()
            .filter(|l| *l == "Worked at Acme Corp")
            .count();
        assert_eq!(mentions, 1);
    }

    #[test]
    fn test_introduction_is_first_long_line() {
        let text = PlainText::from_text(
            "Jane Doe\nResults-driven engineer with eight years of experience.\nshort",
        );
        let fields = assemble(classify(&text, &[]));
        assert_eq!(
            fields.introduction,
            "Results-driven engineer with eight years of experience."
        );
    }

    #[test]
    fn test_bulleted_certification_line_is_bucketed() {
        let text = PlainText::from_text("• Certified Kubernetes Administrator");
        let fields = assemble(classify(&text, &[]));
        assert_eq!(
            fields.certifications,
            vec!["• Certified Kubernetes Administrator"]
        );
    }

    #[test]
    fn test_hobby_vocabulary_scan() {
        let text = PlainText::from_text("Hobbies: photography, cricket and reading.");
        let fields = assemble(classify(&text, &[]));
        assert_eq!(fields.hobbies, vec!["reading", "photography", "cricket"]);
    }

    #[test]
    fn test_empty_document_yields_fully_defaulted_fields() {
        let fields = assemble(classify(&PlainText::from_text(""), &[]));
        assert_eq!(fields, StructuredFields::default());
    }

    #[test]
    fn test_vocabulary_patterns_cover_every_term() {
        assert_eq!(SKILL_PATTERNS.len(), SKILLS_VOCAB.len());
        assert_eq!(HOBBY_PATTERNS.len(), HOBBY_VOCAB.len());
    }

    #[test]
    fn test_entity_rule_competes_at_experience_table_priority() {
        // ORG mention at position 0 outranks the later education keyword;
        // the entity rule's priority comes from the table, not a constant.
        let text = PlainText::from_text("ABC Corp 2020-2023 then University of X");
        let spans = vec![
            span("ABC Corp", EntityLabel::Org, 0),
            span("2020-2023", EntityLabel::Date, 0),
        ];
        let fields = assemble(classify(&text, &spans));
        assert!(fields
            .experience
            .summary_lines
            .contains(&"ABC Corp 2020-2023 then University of X".to_string()));
        assert!(!fields
            .education
            .entries
            .contains(&"ABC Corp 2020-2023 then University of X".to_string()));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = PlainText::from_text(
            "Jane Doe\nSoftware Engineer at ABC Corp (2021-2024)\nBSc, MIT School, 2016\nSkills: python, sql",
        );
        let spans = vec![
            span("Jane Doe", EntityLabel::Person, 0),
            span("ABC Corp", EntityLabel::Org, 1),
            span("2021-2024", EntityLabel::Date, 1),
        ];
        let a = assemble(classify(&text, &spans));
        let b = assemble(classify(&text, &spans));
        assert_eq!(a, b);
    }
}
