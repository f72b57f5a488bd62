// src/extractors/label.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// Annotation printed right after some labels, e.g. "LOCATION(S): (Primary) Dublin".
static LEADING_PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\([^)]+\)\s*").expect("Failed to compile LEADING_PARENTHETICAL_RE")
});

/// Compiled matcher for one single-line label such as `JOB TITLE:`.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    label: String,
    re: Regex,
}

impl LabelMatcher {
    pub fn new(label: &str) -> Result<Self, ExtractError> {
        // `\s*` may cross a line break, so a label alone on its line takes the next line.
        let re = Regex::new(&format!(r"(?i){}\s*(.+)", regex::escape(label)))?;
        Ok(Self { label: label.to_string(), re })
    }

    #[allow(dead_code)]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Value after the first occurrence of the label, or `""` when it never occurs.
    pub fn extract(&self, text: &str) -> String {
        let Some(caps) = self.re.captures(text) else {
            tracing::warn!("Label not found: {}", self.label);
            return String::new();
        };

        let raw = caps.get(1).map_or("", |m| m.as_str()).trim();
        let value = LEADING_PARENTHETICAL_RE.replace(raw, "").into_owned();
        tracing::debug!("Extracted line [{}]: {}", self.label, value);
        value
    }
}

/// One-shot label extraction against already-normalized text.
#[allow(dead_code)]
pub fn extract_label(text: &str, match_label: &str) -> Result<String, ExtractError> {
    Ok(LabelMatcher::new(match_label)?.extract(text))
}
