//! Ordered section rule table and vocabularies.
//!
//! The label/keyword -> section mapping lives in one explicit table so the
//! tie-break policy is auditable and testable in isolation: when a line could
//! satisfy two rules, the rule whose trigger appears earliest on the line
//! wins, and exact position ties resolve by table declaration order.

use once_cell::sync::Lazy;
use regex::Regex;

/// Line-bucketing target. `Skills`, `Hobbies` and `Introduction` are filled by
/// vocabulary/position heuristics rather than the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Education,
    Experience,
    Certifications,
    Projects,
}

/// One entry of the rule table. Declaration order is tie-break priority.
pub struct SectionRule {
    pub section: Section,
    pub triggers: &'static [&'static str],
    /// When set, a trigger only counts if the line also contains a year.
    pub requires_year: bool,
}

/// The fixed, ordered label/keyword -> section rule table.
pub static SECTION_RULES: &[SectionRule] = &[
    SectionRule {
        section: Section::Education,
        triggers: &[
            "bachelor", "bsc", "b.tech", "btech", "master", "msc", "m.tech", "mtech", "phd",
            "diploma", "university", "college", "institute", "school",
        ],
        requires_year: false,
    },
    SectionRule {
        section: Section::Experience,
        triggers: &[
            "intern", "engineer", "manager", "associate", "analyst", "developer",
        ],
        requires_year: true,
    },
    SectionRule {
        section: Section::Certifications,
        triggers: &["certificate", "certification", "certified", "certif", "course"],
        requires_year: false,
    },
    SectionRule {
        section: Section::Projects,
        triggers: &["project", "github.com"],
        requires_year: false,
    },
];

/// Static skills vocabulary matched against the whole document.
pub static SKILLS_VOCAB: &[&str] = &[
    "python",
    "java",
    "c++",
    "c",
    "javascript",
    "rust",
    "go",
    "sql",
    "nosql",
    "mongodb",
    "postgresql",
    "mysql",
    "pandas",
    "numpy",
    "scikit-learn",
    "tensorflow",
    "keras",
    "pytorch",
    "fastapi",
    "flask",
    "docker",
    "kubernetes",
    "aws",
    "gcp",
    "azure",
    "html",
    "css",
    "react",
    "node",
    "spark",
    "hadoop",
];

/// Hobby vocabulary matched against the whole document.
pub static HOBBY_VOCAB: &[&str] = &[
    "reading",
    "travelling",
    "travel",
    "music",
    "photography",
    "gaming",
    "sports",
    "cricket",
    "football",
];

pub static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex"));

/// Leading bullet markers stripped before rule matching.
pub static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-•*‣·~]+\s*").expect("valid bullet regex"));

/// A candidate classification for a line: where the trigger sits and which
/// rule produced it. Lower `position`, then lower `rule_index`, wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub position: usize,
    pub rule_index: usize,
    pub section: Section,
}

/// Table position of the rule for `section`, the priority used when an entity
/// rule competes with keyword triggers. Derived by lookup so reordering the
/// table cannot desynchronize the tie-break.
pub fn rule_index(section: Section) -> Option<usize> {
    SECTION_RULES.iter().position(|r| r.section == section)
}

/// Runs the rule table over one (lowercased) line, returning the winning rule
/// per the tie-break policy, or None when no trigger fires.
pub fn classify_line(lower_line: &str) -> Option<RuleMatch> {
    let has_year = YEAR_RE.is_match(lower_line);

    let mut best: Option<RuleMatch> = None;
    for (rule_index, rule) in SECTION_RULES.iter().enumerate() {
        if rule.requires_year && !has_year {
            continue;
        }
        let earliest = rule
            .triggers
            .iter()
            .filter_map(|t| lower_line.find(t))
            .min();
        if let Some(position) = earliest {
            let candidate = RuleMatch {
                position,
                rule_index,
                section: rule.section,
            };
            let better = match best {
                None => true,
                Some(b) => (position, rule_index) < (b.position, b.rule_index),
            };
            if better {
                best = Some(candidate);
            }
        }
    }
    best
}
