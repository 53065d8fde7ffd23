//! PDF text extraction wrapper
//!
//! Wraps the pdf-extract crate with error handling for:
//! - Non-PDF uploads (missing `%PDF` magic bytes)
//! - Encrypted or corrupted PDFs
//! - Panics inside the PDF parser
//!
//! Only the first page is used, even when it is blank; the text is capped at
//! a fixed number of characters before it goes into the prompt.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::utils::truncate_chars;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file is not a PDF")]
    NotPdf,
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("PDF parser panicked")]
    Panicked,
}

/// Turns uploaded document bytes into prompt text
pub trait TextExtractor: Send + Sync {
    fn first_page_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// pdf-extract backed extractor
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    max_chars: usize,
}

impl PdfTextExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(3000)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn first_page_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let pages = extract_pages(bytes)?;
        Ok(first_page(&pages, self.max_chars))
    }
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[0..4] == b"%PDF"
}

/// Extract text from PDF bytes, one entry per page
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    if !is_pdf(bytes) {
        return Err(ExtractError::NotPdf);
    }

    // pdf-extract panics on some malformed fonts and encodings
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(bytes))) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractError::Parse(e.to_string())),
        Err(_) => Err(ExtractError::Panicked),
    }
}

/// Text of page one, trimmed and capped at `max_chars`. A blank first page
/// stays blank.
pub fn first_page(pages: &[String], max_chars: usize) -> String {
    let page = pages.first().map(|p| p.trim()).unwrap_or("");
    truncate_chars(page, max_chars).to_string()
}
