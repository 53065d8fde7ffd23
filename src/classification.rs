// =============================================================================
// Completion Classification Module
// =============================================================================
//
// Decides which kind of document a model completion describes:
// - contract: a real agreement with flagged clauses (default)
// - educational: a teaching or demonstration document ("how not to draft")
//
// Classification uses lexical markers, not AI, so the same completion always
// lands in the same variant.

use serde::{Deserialize, Serialize};

/// Lexical cues that the completion is describing a teaching example
pub const EDUCATIONAL_MARKERS: &[&str] = &[
    "satirical",
    "teaching example",
    "demonstration",
    "how not to",
];

/// Document kinds a completion can be parsed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    Educational,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Contract => "contract",
            DocumentType::Educational => "educational",
        }
    }
}

/// Classify a completion against an arbitrary marker list (case-insensitive)
pub fn classify_with_markers<S: AsRef<str>>(text: &str, markers: &[S]) -> DocumentType {
    let lower = text.to_lowercase();
    let educational = markers
        .iter()
        .map(|m| m.as_ref().trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .any(|m| lower.contains(&m));

    if educational {
        DocumentType::Educational
    } else {
        DocumentType::Contract
    }
}
