// src/extractors/noise.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Page-level boilerplate that is stripped before any field logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseRule {
    /// Stamp/watermark codes: a long digit run glued to alphanumeric or backslash content.
    Watermark,
    ApprovalStamp,
    ConfidentialityBanner,
    DocumentBanner,
    PageFooter,
    Blank,
}

impl fmt::Display for NoiseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoiseRule::Watermark => "watermark",
            NoiseRule::ApprovalStamp => "approval-stamp",
            NoiseRule::ConfidentialityBanner => "confidentiality-banner",
            NoiseRule::DocumentBanner => "document-banner",
            NoiseRule::PageFooter => "page-footer",
            NoiseRule::Blank => "blank",
        };
        f.write_str(name)
    }
}

// --- Regex Patterns (Lazy Static) ---
// Tested against a single line; order only matters for which rule gets reported.
static NOISE_LINE_RE: Lazy<Vec<(NoiseRule, Regex)>> = Lazy::new(|| {
    [
        (NoiseRule::Watermark, r"^\s*\d{4,}[a-z0-9\\]+"),
        (NoiseRule::ApprovalStamp, r"(?i)Approved On:"),
        (NoiseRule::ConfidentialityBanner, r"(?i)Pfizer Confidential"),
        (NoiseRule::DocumentBanner, r"(?i)JOB DESCRIPTION"),
        (NoiseRule::PageFooter, r"(?i)Page \d+ of \d+"),
    ]
    .iter()
    .filter_map(|(rule, pat)| Regex::new(pat).ok().map(|re| (*rule, re)))
    .collect()
});

/// Returns the rule that marks `line` as noise, if any.
pub fn classify_noise(line: &str) -> Option<NoiseRule> {
    if line.trim().is_empty() {
        return Some(NoiseRule::Blank);
    }
    NOISE_LINE_RE
        .iter()
        .find(|(_, re)| re.is_match(line))
        .map(|(rule, _)| *rule)
}

/// Drops every noise line from `raw` and rejoins the survivors with `\n`.
///
/// Pure and idempotent: the output contains no line that `classify_noise` flags,
/// so running it again removes nothing.
pub fn normalize(raw: &str) -> String {
    let mut removed = 0usize;
    let kept: Vec<&str> = raw
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| {
            let noisy = classify_noise(line).is_some();
            if noisy {
                removed += 1;
            }
            !noisy
        })
        .collect();

    tracing::debug!("Normalizer removed {} noise lines, kept {}", removed, kept.len());
    kept.join("\n")
}
