//! Analysis pipeline
//!
//! PDF bytes → first-page text → prompt → completion (bounded timeout)
//! → normalized result + rendered report.
//!
//! Every failure here is request-scoped. The normalizer step itself never fails.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::ai_client::{CompletionClient, CompletionError};
use crate::analysis::{render, AnalysisResult, Normalizer};
use crate::pdf_extractor::{ExtractError, TextExtractor};
use crate::prompt::build_prompt;
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("no text extracted from document")]
    EmptyText,
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Response body for a successful analysis
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub result_json: AnalysisResult,
    pub result_text: String,
}

impl Analysis {
    pub fn from_completion(normalizer: &Normalizer, completion: &str) -> Self {
        let result_json = normalizer.normalize(completion);
        let result_text = render(&result_json);
        Self { result_json, result_text }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    extractor: Arc<dyn TextExtractor>,
    completion: Arc<dyn CompletionClient>,
    normalizer: Arc<Normalizer>,
    temperature: f32,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        completion: Arc<dyn CompletionClient>,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            extractor,
            completion,
            normalizer: Arc::new(normalizer),
            temperature: 0.2,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_settings(
        settings: &Settings,
        extractor: Arc<dyn TextExtractor>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let normalizer = Normalizer::new()
            .with_extra_markers(settings.extra_educational_markers.iter().cloned());
        Self::new(extractor, completion, normalizer)
            .with_temperature(settings.temperature)
            .with_timeout(settings.completion_timeout())
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn completion_client(&self) -> &dyn CompletionClient {
        self.completion.as_ref()
    }

    /// Extract first-page text on the blocking pool
    pub async fn extract(&self, bytes: Vec<u8>) -> Result<String, AnalyzeError> {
        let extractor = self.extractor.clone();
        let text = tokio::task::spawn_blocking(move || extractor.first_page_text(&bytes))
            .await
            .map_err(|e| AnalyzeError::Internal(format!("extraction task failed: {}", e)))??;

        if text.trim().is_empty() {
            return Err(AnalyzeError::EmptyText);
        }
        Ok(text)
    }

    /// Run the model over already-extracted document text
    pub async fn analyze_text(&self, document_text: &str) -> Result<Analysis, AnalyzeError> {
        if document_text.trim().is_empty() {
            return Err(AnalyzeError::EmptyText);
        }

        let prompt = build_prompt(document_text);
        debug!(chars = document_text.chars().count(), "Sending document to {}", self.completion.backend());

        let completion = tokio::time::timeout(self.timeout, self.completion.complete(&prompt, self.temperature))
            .await
            .map_err(|_| AnalyzeError::Timeout(self.timeout))??;

        let analysis = Analysis::from_completion(&self.normalizer, &completion);
        info!(
            document_type = analysis.result_json.document_type().as_str(),
            model = self.completion.model(),
            "Analysis complete"
        );
        Ok(analysis)
    }

    pub async fn analyze_pdf(&self, bytes: Vec<u8>) -> Result<Analysis, AnalyzeError> {
        let text = self.extract(bytes).await?;
        self.analyze_text(&text).await
    }
}
