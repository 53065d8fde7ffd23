//! Plain-English report for an [`AnalysisResult`]
//! Output is markdown-flavoured text, shown as-is by the upload page and the CLI

use std::fmt::Write;

use super::{AnalysisResult, ClauseRecord};

pub const CONTRACT_HEADER: &str = "This document appears to be a contract.";
pub const CLAUSES_HEADER: &str = "**Potentially Problematic Clauses Identified:**";
pub const NO_CLAUSES_MESSAGE: &str = "No specific unfair clauses were identified in this initial analysis.";
pub const EDUCATIONAL_HEADER: &str = "This document appears to be for educational purposes.";

pub fn render(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::Contract { clauses, .. } => render_contract(clauses),
        AnalysisResult::Educational { teaching_purpose, key_principles, anti_patterns, .. } => {
            render_educational(teaching_purpose, key_principles, anti_patterns)
        }
    }
}

fn render_contract(clauses: &[ClauseRecord]) -> String {
    let mut out = format!("{}\n\n", CONTRACT_HEADER);

    if clauses.is_empty() {
        out.push_str(NO_CLAUSES_MESSAGE);
        out.push('\n');
        return out;
    }

    out.push_str(CLAUSES_HEADER);
    out.push_str("\n\n");
    for (i, clause) in clauses.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(out, "--- Clause {} ---", i + 1);
        let _ = writeln!(out, "**Quoted Text:** {}", clause.quoted_text);
        let _ = writeln!(out, "**Potential Risk:** {}", clause.risk);
        let _ = writeln!(out, "**Suggested Fix:** {}", clause.fix);
        out.push('\n');
    }
    out
}

fn render_educational(purpose: &str, principles: &[String], anti_patterns: &[String]) -> String {
    let mut out = format!("{}\n\n", EDUCATIONAL_HEADER);
    let _ = writeln!(out, "**Teaching Objective:** {}\n", purpose);

    if !principles.is_empty() {
        out.push_str("**Key Principles of Good Drafting:**\n");
        for item in principles {
            let _ = writeln!(out, "- {}", item);
        }
        out.push('\n');
    }

    if !anti_patterns.is_empty() {
        out.push_str("**Things to Avoid (Anti-Patterns):**\n");
        for item in anti_patterns {
            let _ = writeln!(out, "- {}", item);
        }
    }
    out
}
