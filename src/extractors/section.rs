// src/extractors/section.rs

// --- Imports ---
use crate::extractors::classifier::{render, SectionAssembler};
use crate::utils::error::ExtractError;
use regex::Regex;

/// Compiled start/end boundary pair for one multi-line section.
///
/// The end header is a lookahead-only boundary: it cuts the window but is
/// never part of the section body. Every extraction rescans the full text.
#[derive(Debug, Clone)]
pub struct SectionMatcher {
    start_header: String,
    end_header: Option<String>,
    start_re: Regex,
    end_re: Option<Regex>,
}

impl SectionMatcher {
    /// An empty `end_header` means the section runs to the end of the text.
    pub fn new(start_header: &str, end_header: &str) -> Result<Self, ExtractError> {
        let start_re = Regex::new(&format!("(?i){}", regex::escape(start_header)))?;
        let (end_header, end_re) = if end_header.is_empty() {
            (None, None)
        } else {
            let re = Regex::new(&format!("(?i){}", regex::escape(end_header)))?;
            (Some(end_header.to_string()), Some(re))
        };

        Ok(Self {
            start_header: start_header.to_string(),
            end_header,
            start_re,
            end_re,
        })
    }

    #[allow(dead_code)]
    pub fn start_header(&self) -> &str {
        &self.start_header
    }

    #[allow(dead_code)]
    pub fn end_header(&self) -> Option<&str> {
        self.end_header.as_deref()
    }

    /// Finds the raw text between the start header and the end header.
    ///
    /// Returns `None` when the start header is missing, or when a declared end
    /// header never follows it.
    pub fn window<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut start_found = false;

        for start in self.start_re.find_iter(text) {
            start_found = true;
            let rest = &text[start.end()..];

            let Some(end_re) = &self.end_re else {
                return Some(rest);
            };

            // The body must hold at least one char before the boundary.
            if let Some(end) = end_re.find_iter(rest).find(|m| m.start() > 0) {
                return Some(&rest[..end.start()]);
            }
        }

        if start_found {
            tracing::warn!(
                "End header '{}' not found after '{}'; section left empty",
                self.end_header.as_deref().unwrap_or_default(),
                self.start_header
            );
        } else {
            tracing::warn!(
                "Section not found: {} to {}",
                self.start_header,
                self.end_header.as_deref().unwrap_or("<end of text>")
            );
        }
        None
    }

    /// Structured section body (bullets, sub-bullets, subheadings, sentences), or `""`.
    pub fn extract(&self, text: &str) -> String {
        let Some(window) = self.window(text) else {
            return String::new();
        };

        let mut assembler = SectionAssembler::new();
        for line in window.lines() {
            assembler.push_line(line);
        }
        let lines = assembler.finish();
        tracing::debug!("Section '{}' produced {} output lines", self.start_header, lines.len());
        render(&lines)
    }
}

/// One-shot section extraction against already-normalized text.
#[allow(dead_code)]
pub fn extract_section(
    text: &str,
    start_header: &str,
    end_header: &str,
) -> Result<String, ExtractError> {
    Ok(SectionMatcher::new(start_header, end_header)?.extract(text))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_wrapped_bullet_within_bounds() {
        let text = "JOB SUMMARY\n• Lead a team\n  of 5\nJOB RESPONSIBILITIES\n• Other";
        let out = extract_section(text, "JOB SUMMARY", "JOB RESPONSIBILITIES").unwrap();
        assert_eq!(out, "• Lead a team of 5");
    }

    #[test]
    fn test_page_footer_inside_window_is_dropped() {
        let text = "JOB SUMMARY\n• Plan releases\nPage 3 of 10\n• Track risks\nJOB RESPONSIBILITIES";
        let out = extract_section(text, "JOB SUMMARY", "JOB RESPONSIBILITIES").unwrap();
        assert_eq!(out, "• Plan releases\n• Track risks");
        assert!(!out.contains("Page 3 of 10"));
    }

    #[test]
    fn test_subheading_flushes_open_bullet() {
        let text = "JOB RESPONSIBILITIES\n\
                    • Own the roadmap\n\
                    Implementation Leadership:\n\
                    • Run cutover\n\
                    QUALIFICATIONS / SKILLS";
        let out = extract_section(text, "JOB RESPONSIBILITIES", "QUALIFICATIONS / SKILLS").unwrap();
        assert_eq!(out, "• Own the roadmap\n\n🔸 IMPLEMENTATION LEADERSHIP\n• Run cutover");
    }

    #[test]
    fn test_text_after_sub_bullet_is_not_merged() {
        let text = "JOB RESPONSIBILITIES\n• Manage vendors\no Contract reviews\nand renewals\nQUALIFICATIONS / SKILLS";
        let out = extract_section(text, "JOB RESPONSIBILITIES", "QUALIFICATIONS / SKILLS").unwrap();
        assert_eq!(out, "• Manage vendors\n   ◦ Contract reviews");
    }

    #[test]
    fn test_missing_start_header_is_soft_miss() {
        let out = extract_section("nothing relevant here", "JOB SUMMARY", "JOB RESPONSIBILITIES").unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_missing_declared_end_header_yields_empty() {
        let text = "ORGANIZATIONAL RELATIONSHIPS\nWorks with finance and legal.";
        let out = extract_section(text, "ORGANIZATIONAL RELATIONSHIPS", "RESOURCES MANAGED").unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_empty_end_header_runs_to_end_of_text() {
        let text = "RESOURCES MANAGED\nSummary of resources managed, e.g. budget\nBudget of $2M and 4 direct reports.";
        let out = extract_section(text, "RESOURCES MANAGED", "").unwrap();
        assert_eq!(out, "Budget of $2M and 4 direct reports.");
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let text = "Job Summary\nDrives quality.\njob responsibilities\n• x y z";
        let out = extract_section(text, "JOB SUMMARY", "JOB RESPONSIBILITIES").unwrap();
        assert_eq!(out, "Drives quality.");
    }

    #[test]
    fn test_window_excludes_end_header() {
        let matcher = SectionMatcher::new("JOB SUMMARY", "JOB RESPONSIBILITIES").unwrap();
        let window = matcher.window("JOB SUMMARY body text JOB RESPONSIBILITIES tail").unwrap();
        assert_eq!(window, " body text ");
        assert_eq!(matcher.end_header(), Some("JOB RESPONSIBILITIES"));
        assert_eq!(matcher.start_header(), "JOB SUMMARY");
    }

    #[test]
    fn test_output_preserves_source_order() {
        let text = "QUALIFICATIONS / SKILLS\n\
                    Candidates should have:\n\
                    • Degree in science\n\
                    o Chemistry preferred\n\
                    – Five years experience\n\
                    in regulated industry\n\
                    ORGANIZATIONAL RELATIONSHIPS";
        let out = extract_section(text, "QUALIFICATIONS / SKILLS", "ORGANIZATIONAL RELATIONSHIPS").unwrap();
        assert_eq!(
            out,
            "🔸 CANDIDATES SHOULD HAVE\n\
             • Degree in science\n   \
             ◦ Chemistry preferred\n\
             • Five years experience in regulated industry"
        );
    }
}
