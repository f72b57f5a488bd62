// src/schema.rs

// --- Imports ---
use crate::utils::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A single-line field: `match_label` is the literal text preceding the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    pub match_label: String,
}

/// A multi-line section. An empty `end_header` runs the section to end of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub start_header: String,
    #[serde(default)]
    pub end_header: String,
}

/// Fixed, caller-declared field tables. Declaration order is output column order,
/// labels first, sections after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    pub labels: Vec<LabelSpec>,
    pub sections: Vec<SectionSpec>,
}

fn label(name: &str, match_label: &str) -> LabelSpec {
    LabelSpec {
        name: name.to_string(),
        match_label: match_label.to_string(),
    }
}

fn section(name: &str, start_header: &str, end_header: &str) -> SectionSpec {
    SectionSpec {
        name: name.to_string(),
        start_header: start_header.to_string(),
        end_header: end_header.to_string(),
    }
}

impl ExtractionSchema {
    /// The job-description template's schema. Column names and headers are
    /// part of the spreadsheet format and must not drift.
    pub fn job_description() -> Self {
        Self {
            labels: vec![
                label("JOB TITLE", "JOB TITLE:"),
                label("REPORTS TO", "REPORTS TO:"),
                label("DIVISION", "DIVISION/BUSINESS LINE:"),
                label("VERSION DATE", "VERSION DATE:"),
                label("SUB DIVISION", "SUB DIVISION:"),
                label("DEPARTMENT", "DEPARTMENT NAME:"),
                label("LOCATION", "LOCATION(S):"),
            ],
            sections: vec![
                section("JOB SUMMARY", "JOB SUMMARY", "JOB RESPONSIBILITIES"),
                section("RESPONSIBILITIES", "JOB RESPONSIBILITIES", "QUALIFICATIONS / SKILLS"),
                section("QUALIFICATIONS", "QUALIFICATIONS / SKILLS", "ORGANIZATIONAL RELATIONSHIPS"),
                section(
                    "NON-STANDARD WORK",
                    "NON-STANDARD WORK SCHEDULE, TRAVEL OR ENVIRONMENT REQUIREMENTS",
                    "ORGANIZATIONAL RELATIONSHIPS",
                ),
                section("ORGANIZATIONAL RELATIONSHIPS", "ORGANIZATIONAL RELATIONSHIPS", "RESOURCES MANAGED"),
                section("RESOURCES MANAGED", "RESOURCES MANAGED", ""),
            ],
        }
    }

    /// Loads a caller-declared schema from a JSON file and validates it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        tracing::info!("Loaded schema from {}", path.as_ref().display());
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let schema: Self = serde_json::from_str(raw)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Display names must be non-empty and unique; every matcher needs text to match.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.labels.is_empty() && self.sections.is_empty() {
            return Err(SchemaError::Invalid("schema declares no fields".to_string()));
        }

        let mut seen = HashSet::new();
        for name in self.display_names() {
            if name.trim().is_empty() {
                return Err(SchemaError::Invalid("empty display name".to_string()));
            }
            if !seen.insert(name.clone()) {
                return Err(SchemaError::Invalid(format!("duplicate display name '{}'", name)));
            }
        }

        if let Some(spec) = self.labels.iter().find(|l| l.match_label.is_empty()) {
            return Err(SchemaError::Invalid(format!("label '{}' has no match text", spec.name)));
        }
        if let Some(spec) = self.sections.iter().find(|s| s.start_header.is_empty()) {
            return Err(SchemaError::Invalid(format!("section '{}' has no start header", spec.name)));
        }
        Ok(())
    }

    /// Output column names in declaration order.
    pub fn display_names(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.name.clone())
            .chain(self.sections.iter().map(|s| s.name.clone()))
            .collect()
    }
}
