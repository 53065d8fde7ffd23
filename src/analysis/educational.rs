//! Educational completion parsing
//!
//! Used when the model says the upload is a teaching or demonstration
//! document. The reply is a loose markdown list: a labelled purpose line,
//! bold bullets for principles to follow, plain bullets for anti-patterns.

use super::{AnalysisResult, EDUCATIONAL_SUMMARY};
use crate::utils::normalize_newlines;

pub const TEACHING_PURPOSE_LABEL: &str = "Teaching Purpose";
pub const KEY_LESSONS_LABEL: &str = "Key Lessons";
pub const PRINCIPLES_HEADER_LABEL: &str = "Drafting Principles Demonstrated";

const BULLET: &str = "* ";
const BOLD: &str = "**";

/// What a single line contributes
#[derive(Debug, PartialEq, Eq)]
enum LineKind {
    Purpose(String),
    Principle(String),
    AntiPattern(String),
    Skip,
}

fn classify_line(line: &str) -> LineKind {
    if let Some(idx) = line.find(TEACHING_PURPOSE_LABEL) {
        let rest = &line[idx + TEACHING_PURPOSE_LABEL.len()..];
        let purpose = rest
            .replace(BOLD, "")
            .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
            .trim_end()
            .to_string();
        return LineKind::Purpose(purpose);
    }
    if is_header(line) {
        return LineKind::Skip;
    }
    match line.strip_prefix(BULLET) {
        Some(item) if line.contains(BOLD) => LineKind::Principle(strip_markup(item)),
        Some(item) => LineKind::AntiPattern(strip_markup(item)),
        None => LineKind::Skip,
    }
}

/// `**Key Lessons:**` and `**Drafting Principles Demonstrated**`, with or
/// without markup, and nothing else on the line
fn is_header(line: &str) -> bool {
    let bare = line.trim_matches(|c: char| c == '*' || c == ':' || c.is_whitespace());
    bare == KEY_LESSONS_LABEL || bare == PRINCIPLES_HEADER_LABEL
}

fn strip_markup(item: &str) -> String {
    item.replace(BOLD, "").trim().to_string()
}

pub fn parse_educational(raw_text: &str) -> AnalysisResult {
    let mut teaching_purpose = String::new();
    let mut key_principles = Vec::new();
    let mut anti_patterns = Vec::new();

    let text = normalize_newlines(raw_text);
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match classify_line(line) {
            LineKind::Purpose(purpose) => teaching_purpose = purpose,
            LineKind::Principle(item) if !item.is_empty() => key_principles.push(item),
            LineKind::AntiPattern(item) if !item.is_empty() => anti_patterns.push(item),
            _ => {}
        }
    }

    AnalysisResult::Educational {
        summary: EDUCATIONAL_SUMMARY.to_string(),
        teaching_purpose,
        key_principles,
        anti_patterns,
    }
}
