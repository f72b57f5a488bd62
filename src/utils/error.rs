// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document {0} is not valid UTF-8 text")]
    Encoding(String), // Plain-text inputs must be UTF-8

    #[error("Failed to extract text from PDF {path}: {reason}")]
    Pdf { path: String, reason: String },

    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("Extraction aborted: {0}")]
    Panicked(String), // Reader or extractor panicked on this document
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Regular expression error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("I/O error reading schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed schema file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid schema: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Spreadsheet not found: {0}")]
    NotFound(String),

    #[error("Spreadsheet lock poisoned by a failed writer")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
