// src/extractors/record.rs

// --- Imports ---
use crate::extractors::label::LabelMatcher;
use crate::extractors::noise::normalize;
use crate::extractors::section::SectionMatcher;
use crate::schema::{ExtractionSchema, LabelSpec, SectionSpec};
use crate::utils::error::ExtractError;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered display name -> value mapping for one document.
///
/// Always holds one entry per declared field, in declaration order; a field
/// that was not found maps to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecord {
    fields: Vec<(String, String)>,
}

impl ExtractedRecord {
    fn push(&mut self, name: &str, value: String) {
        self.fields.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields that came back non-empty.
    pub fn filled(&self) -> usize {
        self.fields.iter().filter(|(_, value)| !value.is_empty()).count()
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Matchers for a whole schema, compiled once and shared across documents.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    labels: Vec<(String, LabelMatcher)>,
    sections: Vec<(String, SectionMatcher)>,
}

impl FieldExtractor {
    pub fn new(schema: &ExtractionSchema) -> Result<Self, ExtractError> {
        Self::from_specs(&schema.labels, &schema.sections)
    }

    pub fn from_specs(labels: &[LabelSpec], sections: &[SectionSpec]) -> Result<Self, ExtractError> {
        let labels = labels
            .iter()
            .map(|spec| Ok((spec.name.clone(), LabelMatcher::new(&spec.match_label)?)))
            .collect::<Result<Vec<_>, ExtractError>>()?;
        let sections = sections
            .iter()
            .map(|spec| {
                let matcher = SectionMatcher::new(&spec.start_header, &spec.end_header)?;
                Ok((spec.name.clone(), matcher))
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;
        Ok(Self { labels, sections })
    }

    /// Output column names in declaration order.
    #[allow(dead_code)]
    pub fn display_names(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|(name, _)| name.clone())
            .chain(self.sections.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// Normalizes `raw` once, then runs every field against the same text.
    #[allow(dead_code)]
    pub fn build_record(&self, raw: &str) -> ExtractedRecord {
        let normalized = normalize(raw);
        self.extract_normalized(&normalized)
    }

    /// Runs every field against text that has already been normalized.
    pub fn extract_normalized(&self, normalized: &str) -> ExtractedRecord {
        let mut record = ExtractedRecord::default();
        for (name, matcher) in &self.labels {
            record.push(name, matcher.extract(normalized));
        }
        for (name, matcher) in &self.sections {
            record.push(name, matcher.extract(normalized));
        }
        record
    }
}

/// One-shot record assembly for a single document.
#[allow(dead_code)]
pub fn build_record(
    raw: &str,
    labels: &[LabelSpec],
    sections: &[SectionSpec],
) -> Result<ExtractedRecord, ExtractError> {
    Ok(FieldExtractor::from_specs(labels, sections)?.build_record(raw))
}
