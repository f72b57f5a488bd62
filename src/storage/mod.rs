// src/storage/mod.rs
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::extractors::record::ExtractedRecord;
use crate::utils::error::StorageError;

/// Prefixes values that a spreadsheet reader would treat as a formula.
pub fn escape_formula(value: &str) -> Cow<'_, str> {
    if value.starts_with('=') || value.starts_with('-') {
        Cow::Owned(format!("'{}", value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Durable spreadsheet (CSV) that batches of records are merged into.
///
/// One writer at a time: every append holds `write_lock` for the whole
/// read-merge-replace cycle, and the artifact is replaced by an atomic rename,
/// so a failed write leaves the previous file untouched.
pub struct SpreadsheetSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SpreadsheetSink {
    /// Creates the sink, making the parent directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row per record, creating the header row on first write.
    ///
    /// Rows are laid out against the artifact's existing header row when there
    /// is one; columns are matched by name and missing values become `""`.
    pub fn append_rows(&self, headers: &[String], rows: &[ExtractedRecord]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            tracing::info!("No rows to append to {}", self.path.display());
            return Ok(0);
        }

        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        tracing::info!("Starting spreadsheet append: {}", self.path.display());

        let (mut header_row, existing_rows) = if self.path.exists() {
            tracing::info!("Existing spreadsheet found. Appending to it.");
            self.load()?
        } else {
            tracing::info!("Spreadsheet not found. Creating a new one.");
            (Vec::new(), Vec::new())
        };

        if header_row.is_empty() {
            header_row = headers.to_vec();
        } else if header_row != headers {
            tracing::warn!(
                "Existing header row differs from batch schema; writing rows against the existing header"
            );
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .terminator(csv::Terminator::CRLF)
                .from_writer(tmp.as_file_mut());

            writer.write_record(&header_row)?;
            for row in &existing_rows {
                writer.write_record(row)?;
            }
            for record in rows {
                let cells: Vec<String> = header_row
                    .iter()
                    .map(|key| escape_formula(record.get(key).unwrap_or("")).into_owned())
                    .collect();
                writer.write_record(&cells)?;
            }
            // Check for error rather than implicitly flushing and ignoring.
            writer.flush()?;
        }
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        tracing::info!(
            "Spreadsheet write completed: {} ({} existing + {} new rows)",
            self.path.display(),
            existing_rows.len(),
            rows.len()
        );
        Ok(rows.len())
    }

    /// Reads the header row and data rows currently on disk.
    fn load(&self) -> Result<(Vec<String>, Vec<Vec<String>>), StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let header_row: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok((header_row, rows))
    }

    /// Full artifact bytes, for handing back to a download request.
    #[allow(dead_code)]
    pub fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        if !self.path.exists() {
            tracing::warn!("Download requested but spreadsheet not found.");
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }
        Ok(fs::read(&self.path)?)
    }
}

/// Writes per-document JSON records with extraction metadata.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves one record as `<document stem>.json`
    pub fn save_record(&self, source_name: &str, record: &ExtractedRecord) -> Result<PathBuf, StorageError> {
        let stem = Path::new(source_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let file_path = self.base_dir.join(format!("{}.json", stem));

        let payload = serde_json::json!({
            "source": source_name,
            "fields_found": record.filled(),
            "fields_total": record.len(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
            "record": record,
        });

        let payload_str = serde_json::to_string_pretty(&payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::write(&file_path, payload_str)?;

        tracing::info!("Saved record to {}", file_path.display());

        Ok(file_path)
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::record::build_record;
    use crate::schema::LabelSpec;

    fn specs() -> Vec<LabelSpec> {
        vec![
            LabelSpec { name: "TITLE".to_string(), match_label: "Title:".to_string() },
            LabelSpec { name: "NOTE".to_string(), match_label: "Note:".to_string() },
        ]
    }

    fn headers() -> Vec<String> {
        vec!["TITLE".to_string(), "NOTE".to_string()]
    }

    fn record(text: &str) -> ExtractedRecord {
        build_record(text, &specs(), &[]).unwrap()
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_escape_formula() {
        assert_eq!(escape_formula("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(escape_formula("- travel"), "'- travel");
        assert_eq!(escape_formula("• bullet"), "• bullet");
        assert_eq!(escape_formula(""), "");
    }

    #[test]
    fn test_first_write_creates_header_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SpreadsheetSink::new(dir.path().join("out/sheet.csv")).unwrap();

        sink.append_rows(&headers(), &[record("Title: Analyst\nNote: =cmd")]).unwrap();
        sink.append_rows(&headers(), &[record("Title: Lead")]).unwrap();

        let rows = read_rows(sink.path());
        assert_eq!(
            rows,
            vec![
                vec!["TITLE", "NOTE"],
                vec!["Analyst", "'=cmd"],
                vec!["Lead", ""],
            ]
        );
    }

    #[test]
    fn test_existing_header_wins_on_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        fs::write(&path, "NOTE,TITLE\nold note,old title\n").unwrap();

        let sink = SpreadsheetSink::new(&path).unwrap();
        sink.append_rows(&headers(), &[record("Title: New\nNote: fresh")]).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[0], vec!["NOTE", "TITLE"]);
        assert_eq!(rows[1], vec!["old note", "old title"]);
        assert_eq!(rows[2], vec!["fresh", "New"]);
    }

    #[test]
    fn test_empty_batch_leaves_artifact_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SpreadsheetSink::new(dir.path().join("sheet.csv")).unwrap();
        assert_eq!(sink.append_rows(&headers(), &[]).unwrap(), 0);
        assert!(!sink.path().exists());
        assert!(matches!(sink.read_all(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_appends_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SpreadsheetSink::new(dir.path().join("sheet.csv")).unwrap();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let sink = &sink;
                scope.spawn(move || {
                    let batch = vec![record(&format!("Title: T{}", i)), record(&format!("Title: U{}", i))];
                    sink.append_rows(&headers(), &batch).unwrap();
                });
            }
        });

        let rows = read_rows(sink.path());
        assert_eq!(rows.len(), 1 + 16);
        assert_eq!(rows[0], vec!["TITLE", "NOTE"]);
        // Each batch lands as one contiguous block.
        for pair in rows[1..].chunks(2) {
            let t = pair[0][0].trim_start_matches('T');
            assert_eq!(pair[1][0], format!("U{}", t));
        }
    }

    #[test]
    fn test_read_all_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SpreadsheetSink::new(dir.path().join("sheet.csv")).unwrap();
        sink.append_rows(&headers(), &[record("Title: A")]).unwrap();
        let bytes = sink.read_all().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "TITLE,NOTE\r\nA,\r\n");
    }

    #[test]
    fn test_save_record_json() {
        let dir = tempfile::tempdir().unwrap();
        let manager = StorageManager::new(dir.path().join("json")).unwrap();
        let path = manager.save_record("jd_analyst.pdf", &record("Title: Analyst")).unwrap();
        assert!(path.ends_with("jd_analyst.json"));

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["source"], "jd_analyst.pdf");
        assert_eq!(value["fields_found"], 1);
        assert_eq!(value["fields_total"], 2);
        assert_eq!(value["record"]["TITLE"], "Analyst");
        assert_eq!(value["record"]["NOTE"], "");
    }
}
