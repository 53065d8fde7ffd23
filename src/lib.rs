pub mod ai_client;
pub mod analysis;
pub mod classification;
pub mod pdf_extractor;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod settings;
pub mod utils;

pub use analysis::{normalize, render, AnalysisResult, ClauseRecord, Normalizer};
pub use pipeline::{Analysis, AnalyzeError, Analyzer};

/// Install the tracing subscriber used by both binaries.
/// `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
