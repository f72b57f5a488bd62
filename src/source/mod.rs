// src/source/mod.rs
use std::path::Path;
use crate::utils::error::SourceError;

/// Input formats the text source understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Picks the reader from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("txt") | Some("text") => Ok(DocumentKind::Text),
            _ => Err(SourceError::Unsupported(path.display().to_string())),
        }
    }
}

/// Produces the full linearized text of one document.
///
/// Blocking: callers on the async runtime should go through `spawn_blocking`.
pub fn read_document_text(path: &Path) -> Result<String, SourceError> {
    let kind = DocumentKind::from_path(path)?;
    let doc_name = path.display().to_string();

    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: doc_name.clone(),
        source,
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), doc_name);

    let text = match kind {
        DocumentKind::Text => {
            String::from_utf8(bytes).map_err(|_| SourceError::Encoding(doc_name.clone()))?
        }
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(&bytes).map_err(|e| SourceError::Pdf {
            path: doc_name.clone(),
            reason: e.to_string(),
        })?,
    };

    if text.trim().is_empty() {
        tracing::warn!("Document {} produced no text", doc_name);
    }
    Ok(text)
}
