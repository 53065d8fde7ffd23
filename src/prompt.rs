//! Contract review prompt
//!
//! The model is asked for `|||`-delimited quote/risk/fix triples separated by
//! blank lines. The normalizer tolerates replies that ignore this.

pub const CONTRACT_REVIEW_PROMPT: &str = r#"Analyze the following contract and identify potentially unfair clauses.
Focus on clauses that could disadvantage one party.
For each such clause, provide:

1. [EXACT QUOTE] - Copy the full clause text.
2. [RISK] - Explain the legal/business risk in plain language (1-2 sentences).
3. [FIX] - Suggest specific alternative wording to make it fairer.

Separate each part with "|||". Separate each clause analysis with two newlines.

Example:
"Consultant may not replace staff without approval" ||| Risk: This gives the client excessive control and could delay the project if approval is slow. ||| Fix: "Consultant may replace staff with equally qualified personnel, with notice to Client."

Pay special attention to:
- Termination clauses (especially unequal notice periods)
- Indemnification (if one-sided or overly broad)
- Intellectual property ownership
- Liability limitations
- Insurance requirements that may be excessive
- Payment terms

CONTRACT:
"#;

/// Full prompt for one document
pub fn build_prompt(document_text: &str) -> String {
    format!("{}{}", CONTRACT_REVIEW_PROMPT, document_text)
}
