//! Completion normalization for contract reviews
//!
//! Turns the model's free-text reply into an [`AnalysisResult`]:
//! 1. Classify the completion (contract vs. educational) by lexical markers
//! 2. Parse clause blocks or educational bullet lists
//! 3. Render the result as a plain-text/markdown report
//!
//! Nothing in here can fail. Missing data becomes a sentinel string, an
//! empty list, or a skipped block.

pub mod clause;
pub mod educational;
pub mod render;

use serde::{Deserialize, Serialize};

use crate::classification::{classify_with_markers, DocumentType, EDUCATIONAL_MARKERS};

pub use clause::ClauseFormat;
pub use render::render;

/// Placeholder for a clause whose quote could not be recovered
pub const QUOTE_NOT_SPECIFIED: &str = "Not specified";
/// Placeholder for a missing risk explanation
pub const RISK_NOT_SPECIFIED: &str = "Not specified";
/// Placeholder for a missing suggested fix
pub const FIX_NOT_PROVIDED: &str = "Not provided";

pub const CONTRACT_SUMMARY: &str = "Contract Analysis Complete";
pub const EDUCATIONAL_SUMMARY: &str = "Educational Content Detected";

/// One flagged contract clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseRecord {
    pub quoted_text: String,
    pub risk: String,
    pub fix: String,
}

/// Structured outcome of one completion, tagged by `document_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "document_type", rename_all = "snake_case")]
pub enum AnalysisResult {
    Contract {
        summary: String,
        clauses: Vec<ClauseRecord>,
    },
    Educational {
        summary: String,
        teaching_purpose: String,
        key_principles: Vec<String>,
        anti_patterns: Vec<String>,
    },
}

impl AnalysisResult {
    pub fn document_type(&self) -> DocumentType {
        match self {
            AnalysisResult::Contract { .. } => DocumentType::Contract,
            AnalysisResult::Educational { .. } => DocumentType::Educational,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            AnalysisResult::Contract { summary, .. } => summary,
            AnalysisResult::Educational { summary, .. } => summary,
        }
    }
}

/// Completion normalizer with a configurable educational marker list
#[derive(Debug, Clone)]
pub struct Normalizer {
    markers: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            markers: EDUCATIONAL_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add markers on top of the built-in list
    pub fn with_extra_markers<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for marker in extra {
            let marker = marker.into();
            if !marker.trim().is_empty() && !self.markers.contains(&marker) {
                self.markers.push(marker);
            }
        }
        self
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn classify(&self, raw_text: &str) -> DocumentType {
        classify_with_markers(raw_text, &self.markers)
    }

    /// Parse a raw completion. The variant is decided once, up front.
    pub fn normalize(&self, raw_text: &str) -> AnalysisResult {
        match self.classify(raw_text) {
            DocumentType::Educational => educational::parse_educational(raw_text),
            DocumentType::Contract => AnalysisResult::Contract {
                summary: CONTRACT_SUMMARY.to_string(),
                clauses: clause::parse_clauses(raw_text),
            },
        }
    }
}

/// Normalize with the built-in marker list
pub fn normalize(raw_text: &str) -> AnalysisResult {
    Normalizer::default().normalize(raw_text)
}
