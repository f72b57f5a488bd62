// src/pipeline.rs
//! Batch orchestration: extract many documents concurrently, then hand the
//! successful records to the spreadsheet sink as one ordered write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};

use crate::extractors::noise::normalize;
use crate::extractors::record::{ExtractedRecord, FieldExtractor};
use crate::source::read_document_text;
use crate::storage::SpreadsheetSink;
use crate::utils::debug_dump::save_debug_dump;
use crate::utils::error::{ExtractError, SourceError, StorageError};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on documents extracted at the same time.
    pub jobs: usize,
    /// When set, every document gets a normalization debug dump here.
    pub debug_dir: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { jobs: 4, debug_dir: None }
    }
}

/// Result for one input document. A failure never affects other documents.
#[derive(Debug)]
pub enum DocumentOutcome {
    Extracted { source: PathBuf, record: ExtractedRecord },
    Failed { source: PathBuf, error: SourceError },
}

impl DocumentOutcome {
    #[allow(dead_code)]
    pub fn source(&self) -> &Path {
        match self {
            DocumentOutcome::Extracted { source, .. } | DocumentOutcome::Failed { source, .. } => source,
        }
    }
}

/// Outcomes in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn records(&self) -> Vec<ExtractedRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                DocumentOutcome::Extracted { record, .. } => Some(record.clone()),
                DocumentOutcome::Failed { .. } => None,
            })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Extracted { .. }))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

/// Reads, normalizes (once) and extracts a single document.
pub fn process_document(extractor: &FieldExtractor, path: &Path, debug_dir: Option<&Path>) -> DocumentOutcome {
    tracing::info!("Extracting fields from: {}", path.display());

    let raw = match read_document_text(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::error!("Failed to read {}: {}", path.display(), error);
            return DocumentOutcome::Failed {
                source: path.to_path_buf(),
                error,
            };
        }
    };

    let normalized = normalize(&raw);

    if let Some(dir) = debug_dir {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("document");
        if let Err(e) = save_debug_dump(dir, name, &raw, &normalized) {
            tracing::warn!("Failed to create debug dump for {}: {}", path.display(), e);
        }
    }

    let record = extractor.extract_normalized(&normalized);
    tracing::info!(
        "Extraction complete: {} ({}/{} fields found)",
        path.display(),
        record.filled(),
        record.len()
    );

    DocumentOutcome::Extracted {
        source: path.to_path_buf(),
        record,
    }
}

/// Extracts every file on the blocking pool, at most `options.jobs` at a time.
pub async fn extract_batch(
    extractor: Arc<FieldExtractor>,
    files: Vec<PathBuf>,
    options: &BatchOptions,
) -> Result<BatchReport, ExtractError> {
    let debug_dir = options.debug_dir.clone();
    run_batch(files, options.jobs, move |path| {
        process_document(&extractor, path, debug_dir.as_deref())
    })
    .await
}

/// Runs `work` once per file and collects outcomes in input order.
///
/// A task that panics becomes a `Failed` outcome for its own document only.
async fn run_batch<F>(files: Vec<PathBuf>, jobs: usize, work: F) -> Result<BatchReport, ExtractError>
where
    F: Fn(&Path) -> DocumentOutcome + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();
    let mut in_flight: HashMap<Id, (usize, PathBuf)> = HashMap::new();
    let total = files.len();

    for (idx, path) in files.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))?;
        let work = Arc::clone(&work);
        let task_path = path.clone();

        let handle = tasks.spawn_blocking(move || {
            let _permit = permit;
            (idx, work(&task_path))
        });
        in_flight.insert(handle.id(), (idx, path));
    }

    let mut slots: Vec<Option<DocumentOutcome>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, (idx, outcome))) => {
                in_flight.remove(&id);
                slots[idx] = Some(outcome);
            }
            Err(e) => {
                let Some((idx, path)) = in_flight.remove(&e.id()) else {
                    return Err(ExtractError::Task(e.to_string()));
                };
                let reason = join_failure_reason(e);
                tracing::error!("Extraction of {} aborted: {}", path.display(), reason);
                slots[idx] = Some(DocumentOutcome::Failed {
                    source: path,
                    error: SourceError::Panicked(reason),
                });
            }
        }
    }

    Ok(BatchReport {
        outcomes: slots.into_iter().flatten().collect(),
    })
}

fn join_failure_reason(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Flushes all successful records of a batch to the sink as one ordered write.
pub fn persist_batch(
    sink: &SpreadsheetSink,
    headers: &[String],
    report: &BatchReport,
) -> Result<usize, StorageError> {
    let records = report.records();
    sink.append_rows(headers, &records)
}
