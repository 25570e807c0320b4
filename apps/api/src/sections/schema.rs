//! Output schema for structured resume fields.
//!
//! Every key is always serialized. Missing content defaults to the
//! type-appropriate empty value — the assembler never omits a key.

use serde::{Deserialize, Serialize};

/// Education section: matched lines (or ORG fallback entries).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationSection {
    pub entries: Vec<String>,
}

/// Experience section: full matched lines plus short ORG mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSection {
    pub summary_lines: Vec<String>,
}

/// The fixed response payload: candidate name plus the seven resume sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredFields {
    pub name: String,
    pub introduction: String,
    pub education: EducationSection,
    pub experience: ExperienceSection,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub projects: Vec<String>,
    pub hobbies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The serialized default must carry every schema key with empty values.
    #[test]
    fn test_default_serializes_all_keys() {
        let json = serde_json::to_value(StructuredFields::default()).unwrap();
        let obj = json.as_object().unwrap();

        for key in [
            "name",
            "introduction",
            "education",
            "experience",
            "skills",
            "certifications",
            "projects",
            "hobbies",
        ] {
            assert!(obj.contains_key(key), "missing key '{key}'");
        }
        assert_eq!(obj.len(), 8);
        assert_eq!(json["name"], "");
        assert_eq!(json["education"]["entries"], serde_json::json!([]));
        assert_eq!(json["experience"]["summary_lines"], serde_json::json!([]));
        assert_eq!(json["skills"], serde_json::json!([]));
    }
}
