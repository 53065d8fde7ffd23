//! HTTP API for contract analysis
//!
//! Routes:
//! - `GET /` - upload page
//! - `POST /analyze` - multipart `file` field, returns `{result_json, result_text}`
//! - `GET /health` - liveness and backend info
//!
//! Every error is `{"error": "..."}`. Upstream details are logged, never returned.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::pdf_extractor::ExtractError;
use crate::pipeline::{Analysis, AnalyzeError, Analyzer};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const UPLOAD_FIELD: &str = "file";
const GENERIC_FAILURE: &str = "Analysis failed. Please try again later.";
const INDEX_HTML: &str = include_str!("../static/index.html");

// ============================================================================
// AppState
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer, start_time: Instant::now() }
    }
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Only PDF files are supported")]
    UnsupportedFileType,
    #[error("{message}")]
    BadUpload { status: StatusCode, message: String },
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::UnsupportedFileType => StatusCode::BAD_REQUEST,
            ApiError::BadUpload { status, .. } => *status,
            ApiError::Analyze(e) => match e {
                AnalyzeError::Extract(ExtractError::NotPdf) => StatusCode::BAD_REQUEST,
                AnalyzeError::Extract(_) | AnalyzeError::EmptyText => StatusCode::UNPROCESSABLE_ENTITY,
                AnalyzeError::Completion(_) => StatusCode::BAD_GATEWAY,
                AnalyzeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AnalyzeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to show the uploader
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Analyze(e) => match e {
                AnalyzeError::Extract(ExtractError::NotPdf) => ApiError::UnsupportedFileType.to_string(),
                AnalyzeError::Extract(_) => "Could not read text from PDF".to_string(),
                AnalyzeError::EmptyText => "Empty PDF or no text extracted".to_string(),
                AnalyzeError::Completion(_) | AnalyzeError::Timeout(_) | AnalyzeError::Internal(_) => {
                    GENERIC_FAILURE.to_string()
                }
            },
            other => other.to_string(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadUpload { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadUpload { status: err.status(), message: err.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Analysis failed: {}", self);
        } else {
            warn!(status = status.as_u16(), "Rejected upload: {}", self);
        }
        (status, Json(serde_json::json!({"error": self.public_message()}))).into_response()
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    backend: String,
    model: String,
    uptime_secs: u64,
}

// ============================================================================
// Handlers
// ============================================================================

// GET /
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// POST /analyze
async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or(ApiError::MissingFile)?;
    // Browsers send an empty part when no file was picked
    if filename.is_empty() && bytes.is_empty() {
        return Err(ApiError::MissingFile);
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::UnsupportedFileType);
    }

    info!(file = %filename, bytes = bytes.len(), "[POST /analyze] Received upload");
    let analysis = state.analyzer.analyze_pdf(bytes.to_vec()).await?;
    Ok(Json(analysis))
}

// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let client = state.analyzer.completion_client();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        backend: client.backend().to_string(),
        model: client.model().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Normalizer;
    use crate::pipeline::tests::{CannedCompletion, PlainTextExtractor};
    use reqwest::multipart::{Form, Part};
    use std::sync::Arc;
    use std::time::Duration;

    const TWO_CLAUSES: &str = "\"Clause A\" ||| Risk: B ||| Fix: C\n\n\"Clause D\" ||| Risk: E ||| Fix: F";

    async fn spawn(completion: CannedCompletion, max_upload_bytes: usize) -> String {
        let analyzer = Analyzer::new(Arc::new(PlainTextExtractor), Arc::new(completion), Normalizer::new())
            .with_timeout(Duration::from_millis(200));
        let app = router(AppState::new(analyzer), max_upload_bytes);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn pdf_form(filename: &str, body: &[u8]) -> Form {
        Form::new().part("file", Part::bytes(body.to_vec()).file_name(filename.to_string()))
    }

    async fn post_form(base: &str, form: Form) -> (u16, serde_json::Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/analyze", base))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024 * 1024).await;
        let (status, body) = post_form(&base, pdf_form("Lease.PDF", b"Tenant pays all repairs.")).await;

        assert_eq!(status, 200);
        assert_eq!(body["result_json"]["document_type"], "contract");
        assert_eq!(body["result_json"]["clauses"].as_array().unwrap().len(), 2);
        assert_eq!(body["result_json"]["clauses"][1]["quoted_text"], "\"Clause D\"");
        let text = body["result_text"].as_str().unwrap();
        assert!(text.find("--- Clause 1 ---").unwrap() < text.find("--- Clause 2 ---").unwrap());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024 * 1024).await;
        let form = Form::new().text("note", "no file here");
        let (status, body) = post_form(&base, form).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_non_pdf_filename() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024 * 1024).await;
        let (status, body) = post_form(&base, pdf_form("contract.docx", b"text")).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Only PDF files are supported");
    }

    #[tokio::test]
    async fn test_unreadable_pdf() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024 * 1024).await;
        let (status, body) = post_form(&base, pdf_form("broken.pdf", b"BROKEN xref")).await;
        assert_eq!(status, 422);
        assert_eq!(body["error"], "Could not read text from PDF");
    }

    #[tokio::test]
    async fn test_empty_text() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024 * 1024).await;
        let (status, body) = post_form(&base, pdf_form("blank.pdf", b"  \n  ")).await;
        assert_eq!(status, 422);
        assert_eq!(body["error"], "Empty PDF or no text extracted");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic() {
        let base = spawn(CannedCompletion::failing(500), 1024 * 1024).await;
        let (status, body) = post_form(&base, pdf_form("c.pdf", b"contract text")).await;
        assert_eq!(status, 502);
        assert_eq!(body["error"], GENERIC_FAILURE);
        assert!(!body.to_string().contains("upstream detail"));
    }

    #[tokio::test]
    async fn test_upstream_timeout() {
        let base = spawn(CannedCompletion::slow(TWO_CLAUSES, Duration::from_secs(5)), 1024 * 1024).await;
        let (status, body) = post_form(&base, pdf_form("c.pdf", b"contract text")).await;
        assert_eq!(status, 504);
        assert_eq!(body["error"], GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024).await;
        let (status, body) = post_form(&base, pdf_form("big.pdf", &vec![b'a'; 2048])).await;
        assert_eq!(status, 413);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_not_multipart() {
        let base = spawn(CannedCompletion::replying(TWO_CLAUSES), 1024 * 1024).await;
        let response = reqwest::Client::new()
            .post(format!("{}/analyze", base))
            .json(&serde_json::json!({"file": "x"}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_health_and_index() {
        let base = spawn(CannedCompletion::replying(""), 1024).await;
        let health: serde_json::Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["backend"], "canned");
        assert_eq!(health["model"], "canned-model");

        let page = reqwest::get(format!("{}/", base)).await.unwrap().text().await.unwrap();
        assert!(page.contains("/analyze"));
    }

    #[test]
    fn test_error_statuses() {
        use crate::ai_client::CompletionError;

        assert_eq!(ApiError::from(AnalyzeError::EmptyText).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::from(AnalyzeError::Extract(ExtractError::NotPdf)).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(AnalyzeError::Completion(CompletionError::EmptyResponse)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(AnalyzeError::Internal("join".to_string())).public_message(),
            GENERIC_FAILURE
        );
    }
}
