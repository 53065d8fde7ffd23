//! Clause block parsing
//!
//! A contract completion is a sequence of blocks separated by blank lines.
//! Each block is handed to the formats in [`ClauseFormat::ORDER`]; the first
//! format that accepts the block supplies its segments.

use tracing::trace;

use super::{ClauseRecord, FIX_NOT_PROVIDED, QUOTE_NOT_SPECIFIED, RISK_NOT_SPECIFIED};
use crate::utils::normalize_newlines;

/// Segment separator the prompt asks the model to use
pub const DELIMITER: &str = "|||";

/// Block formats, tried in [`ClauseFormat::ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseFormat {
    /// `quote ||| risk ||| fix`, exactly three segments
    Delimited,
    /// quote, risk and fix on consecutive lines
    LineTagged,
}

impl ClauseFormat {
    pub const ORDER: [ClauseFormat; 2] = [ClauseFormat::Delimited, ClauseFormat::LineTagged];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseFormat::Delimited => "delimited",
            ClauseFormat::LineTagged => "line_tagged",
        }
    }

    /// Trimmed segments for `block`, or None if this format does not apply
    pub fn segments(&self, block: &str) -> Option<Vec<String>> {
        match self {
            ClauseFormat::Delimited => {
                let parts: Vec<&str> = block.split(DELIMITER).collect();
                if parts.len() == 3 {
                    Some(parts.iter().map(|p| p.trim().to_string()).collect())
                } else {
                    None
                }
            }
            ClauseFormat::LineTagged => {
                let lines: Vec<String> = block
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .take(3)
                    .map(String::from)
                    .collect();
                if lines.is_empty() { None } else { Some(lines) }
            }
        }
    }
}

/// Build a record from positional segments; None when every segment is empty
pub fn record_from_segments(segments: &[String]) -> Option<ClauseRecord> {
    if segments.iter().all(|s| s.is_empty()) {
        return None;
    }

    let field = |i: usize, sentinel: &str| {
        segments
            .get(i)
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| sentinel.to_string())
    };

    Some(ClauseRecord {
        quoted_text: field(0, QUOTE_NOT_SPECIFIED),
        risk: field(1, RISK_NOT_SPECIFIED),
        fix: field(2, FIX_NOT_PROVIDED),
    })
}

/// Parse one trimmed, non-empty block with the given format order
pub fn parse_block(block: &str, order: &[ClauseFormat]) -> Option<ClauseRecord> {
    let (format, segments) = order
        .iter()
        .find_map(|format| format.segments(block).map(|segments| (format, segments)))?;
    let record = record_from_segments(&segments);
    trace!(format = format.as_str(), skipped = record.is_none(), "Parsed clause block");
    record
}

/// Split a completion into blank-line separated blocks, trimmed, empties dropped
pub fn split_blocks(raw_text: &str) -> Vec<String> {
    normalize_newlines(raw_text)
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(String::from)
        .collect()
}

/// Parse every block of a contract completion, preserving order
pub fn parse_clauses(raw_text: &str) -> Vec<ClauseRecord> {
    split_blocks(raw_text)
        .iter()
        .filter_map(|block| parse_block(block, &ClauseFormat::ORDER))
        .collect()
}
