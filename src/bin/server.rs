//! FinePrint Server — HTTP API for contract clause review.
//!
//! Thin axum server wrapping the shared fineprint_lib analysis pipeline.
//!
//! Usage:
//!   GEMINI_API_KEY=... FINEPRINT_BIND=0.0.0.0:5000 fineprint-server
//!
//! Or with args:
//!   fineprint-server --config /path/to/settings.json --bind 127.0.0.1:5000

use clap::Parser;
use fineprint_lib::ai_client;
use fineprint_lib::pdf_extractor::PdfTextExtractor;
use fineprint_lib::server::{router, AppState};
use fineprint_lib::settings;
use fineprint_lib::Analyzer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fineprint-server", version, about = "Contract clause review HTTP API")]
struct Args {
    /// Settings file (default: <config dir>/fineprint/settings.json)
    #[arg(long, env = "FINEPRINT_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides settings and FINEPRINT_BIND
    #[arg(long)]
    bind: Option<String>,

    /// LLM backend: gemini or anthropic
    #[arg(long)]
    backend: Option<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() {
    fineprint_lib::init_tracing("info,tower_http=info");
    let args = Args::parse();

    let mut settings = match settings::load_with_env(args.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(backend) = args.backend {
        settings.llm_backend = backend.to_lowercase();
    }

    let completion = match ai_client::build_client(&settings) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to configure LLM client: {}", e);
            std::process::exit(1);
        }
    };
    info!(backend = completion.backend(), model = completion.model(), "LLM client ready");

    let extractor = Arc::new(PdfTextExtractor::new(settings.max_document_chars));
    let analyzer = Analyzer::from_settings(&settings, extractor, completion);
    let app = router(AppState::new(analyzer), settings.max_upload_bytes);

    let listener = match tokio::net::TcpListener::bind(&settings.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", settings.bind_addr, e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", settings.bind_addr);
    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
