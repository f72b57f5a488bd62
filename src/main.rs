// src/main.rs
mod utils;
mod extractors;
mod pipeline;
mod schema;
mod source;
mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use utils::AppError;
use extractors::FieldExtractor;
use pipeline::{BatchOptions, DocumentOutcome};
use schema::ExtractionSchema;
use storage::{SpreadsheetSink, StorageManager};

/// Command Line Interface for the job-description field extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Job-description documents to process (.pdf or .txt)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Spreadsheet that extracted rows are appended to
    #[arg(short, long, default_value = "sheet.csv")]
    output: PathBuf,

    /// JSON file declaring the label and section tables (defaults to the built-in job-description schema)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Also save every extracted record as JSON in this directory
    #[arg(long)]
    json_dir: Option<PathBuf>,

    /// Maximum number of documents extracted concurrently
    #[arg(short, long, default_value = "4", env = "JD_JOBS")]
    jobs: usize,

    /// Debug mode - save raw text, normalized text and a noise report per document
    #[arg(short, long)]
    debug: bool,

    /// Directory for debug output
    #[arg(long, default_value = "./debug")]
    debug_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    if args.jobs == 0 {
        return Err(AppError::Config("--jobs must be at least 1".to_string()));
    }

    // 3. Load the declared schema and compile its matchers once
    let schema = match &args.schema {
        Some(path) => ExtractionSchema::from_json_file(path)?,
        None => ExtractionSchema::job_description(),
    };
    let headers = schema.display_names();
    let extractor = Arc::new(FieldExtractor::new(&schema)?);
    tracing::info!("Schema ready: {} labels, {} sections", schema.labels.len(), schema.sections.len());

    // 4. Initialize storage
    let sink = SpreadsheetSink::new(&args.output)?;
    let json_store = match &args.json_dir {
        Some(dir) => Some(StorageManager::new(dir)?),
        None => None,
    };

    // 5. Extract every document
    let options = BatchOptions {
        jobs: args.jobs,
        debug_dir: args.debug.then(|| args.debug_dir.clone()),
    };
    let report = pipeline::extract_batch(extractor, args.files.clone(), &options).await?;

    for outcome in &report.outcomes {
        match outcome {
            DocumentOutcome::Extracted { source, record } => {
                if let Some(store) = &json_store {
                    let name = source.file_name().and_then(|n| n.to_str()).unwrap_or("document");
                    if let Err(e) = store.save_record(name, record) {
                        tracing::error!("Failed to save JSON record for {}: {}", source.display(), e);
                    }
                }
            }
            DocumentOutcome::Failed { source, error } => {
                tracing::error!("Skipped {}: {}", source.display(), error);
            }
        }
    }

    let success_count = report.success_count();
    let failure_count = report.failure_count();
    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any of {} documents",
            failure_count
        )));
    }

    // 6. One ordered write for the whole batch
    let written = pipeline::persist_batch(&sink, &headers, &report)?;
    tracing::info!("Appended {} rows to {}", written, sink.path().display());

    Ok(())
}
