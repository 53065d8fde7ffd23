//! FinePrint CLI - run contract reviews without the web server
//!
//! Usage: fineprint-cli [OPTIONS] <COMMAND>
//!
//! Supports JSON output for scripting.

use chrono::Local;
use clap::{Parser, Subcommand};
use fineprint_lib::pdf_extractor::{PdfTextExtractor, TextExtractor};
use fineprint_lib::{ai_client, prompt, settings, Analysis, Analyzer, Normalizer};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fineprint-cli", version, about = "Review contract PDFs for risky clauses")]
struct Cli {
    /// Settings file (default: <config dir>/fineprint/settings.json)
    #[arg(long, global = true, env = "FINEPRINT_CONFIG")]
    config: Option<PathBuf>,

    /// Print the structured result as JSON instead of the report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, send to the model, and print the analysis
    Analyze {
        /// Contract PDF
        pdf: PathBuf,
        /// Also save the report (default name: contract-analysis-YYYY-MM-DD.txt)
        #[arg(long)]
        save: Option<Option<PathBuf>>,
    },
    /// Normalize a saved model completion (file or stdin); no network
    Normalize {
        /// Completion text file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print the prompt that would be sent for a PDF
    Prompt {
        pdf: PathBuf,
    },
}

fn default_report_name() -> PathBuf {
    PathBuf::from(format!("contract-analysis-{}.txt", Local::now().format("%Y-%m-%d")))
}

fn read_pdf(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn print_analysis(analysis: &Analysis, json: bool) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(&analysis.result_json)
            .map_err(|e| format!("Failed to serialize result: {}", e))?;
        println!("{}", out);
    } else {
        print!("{}", analysis.result_text);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), String> {
    let settings = settings::load_with_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { pdf, save } => {
            let bytes = read_pdf(&pdf)?;
            let completion = ai_client::build_client(&settings).map_err(|e| e.to_string())?;
            let extractor = Arc::new(PdfTextExtractor::new(settings.max_document_chars));
            let analyzer = Analyzer::from_settings(&settings, extractor, completion);

            let analysis = analyzer.analyze_pdf(bytes).await.map_err(|e| e.to_string())?;
            print_analysis(&analysis, cli.json)?;

            if let Some(path) = save {
                let path = path.unwrap_or_else(default_report_name);
                std::fs::write(&path, &analysis.result_text)
                    .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
                tracing::info!("Saved report to {}", path.display());
            }
        }
        Commands::Normalize { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .map_err(|e| format!("Failed to read stdin: {}", e))?;
                    buf
                }
            };
            let normalizer = Normalizer::new()
                .with_extra_markers(settings.extra_educational_markers.iter().cloned());
            print_analysis(&Analysis::from_completion(&normalizer, &raw), cli.json)?;
        }
        Commands::Prompt { pdf } => {
            let bytes = read_pdf(&pdf)?;
            let text = PdfTextExtractor::new(settings.max_document_chars)
                .first_page_text(&bytes)
                .map_err(|e| e.to_string())?;
            println!("{}", prompt::build_prompt(&text));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    fineprint_lib::init_tracing("warn");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
