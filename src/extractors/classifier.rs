// src/extractors/classifier.rs
//! Line-by-line classification of a bounded section window.
//!
//! Every trimmed line is first classified into a [`LineKind`]; the
//! [`SectionAssembler`] then applies one transition per line against its
//! [`BulletState`], accumulating soft-wrapped bullets and emitting
//! [`OutputLine`]s in source order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Lines shorter than this (in chars) are dropped as stray glyphs.
const MIN_LINE_CHARS: usize = 3;

const TOP_BULLET: &str = "•";
const SYMBOL_FONT_BULLET: char = '\u{F0B7}';

// --- Regex Patterns (Lazy Static) ---
// Banners that survive normalization when they are split across lines.
static UNIVERSAL_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(approved|GMT|Pfizer Confidential|JOB DESCRIPTION|Page \d+ of \d+)")
        .expect("Failed to compile UNIVERSAL_NOISE_RE")
});

// Form-hint prose printed under each section header of the template.
static INSTRUCTION_RE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Job summary
        r"(?i)^\s*summarize the primary purpose",
        // Job responsibilities
        r"(?i)^\s*indicate the primary responsibilities",
        // Qualifications / skills
        r"(?i)^\s*indicate qualifications and skills",
        r"(?i)^\s*licenses, certifications",
        // Organizational relationships
        r"(?i)^\s*provide the primary groups",
        r"(?i)^\s*include any external interactions",
        // Resources managed
        r"(?i)^\s*summary of resources managed",
        // Generic hints
        r"(?i)^\s*this section describes",
        r"(?i)^\s*describe required knowledge",
        r"(?i)^\s*provide a brief overview",
        // Non-standard work
        r"(?i)^\s*\(not all roles will have non-standard work schedule",
        r"(?i)^\s*include any work schedule, travel",
        r"(?i)^\s*types of requirements",
        r"(?i)^\s*any criteria indicated must be job-related",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

static SUBHEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z].*:\s*$").expect("Failed to compile SUBHEADING_RE")
});

static BULLET_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[•\u{F0B7}\-–\s]+").expect("Failed to compile BULLET_MARKER_RE")
});

static SUB_BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[o▪→]\s+(.*)$").expect("Failed to compile SUB_BULLET_RE")
});

/// What a single trimmed source line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Noise,
    Instruction,
    /// Bare heading such as `Implementation Leadership:` (full trimmed line).
    Subheading(&'a str),
    /// Top-level bullet, markers stripped.
    Bullet(&'a str),
    /// Nested bullet (`o`, `▪`, `→`), glyph stripped.
    SubBullet(&'a str),
    Text(&'a str),
}

/// Classifies one line. The line is trimmed before any test runs.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let clean = line.trim();

    if clean.chars().count() < MIN_LINE_CHARS || UNIVERSAL_NOISE_RE.is_match(clean) {
        return LineKind::Noise;
    }

    if INSTRUCTION_RE.iter().any(|re| re.is_match(clean)) {
        return LineKind::Instruction;
    }

    if SUBHEADING_RE.is_match(clean) {
        return LineKind::Subheading(clean);
    }

    if clean.starts_with(TOP_BULLET)
        || clean.starts_with(SYMBOL_FONT_BULLET)
        || clean.starts_with('-')
        || clean.starts_with('–')
    {
        let marker_len = BULLET_MARKER_RE.find(clean).map_or(0, |m| m.end());
        return LineKind::Bullet(&clean[marker_len..]);
    }

    if let Some(caps) = SUB_BULLET_RE.captures(clean) {
        let rest = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::SubBullet(rest.trim());
    }

    LineKind::Text(clean)
}

/// Where the assembler is relative to bullet runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletState {
    /// No bullet run open: free text is emitted as plain sentences.
    #[default]
    Plain,
    /// A top-level bullet is accumulating: free text is a soft-wrapped continuation.
    InBullet,
    /// Sub-bullets follow a bullet run: free text has no bullet to wrap into and is dropped.
    InSubBullet,
}

/// One rendered line of section output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Bullet(String),
    SubBullet(String),
    /// Upper-cased heading text, colons removed.
    Subheading(String),
    Text(String),
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputLine::Bullet(text) => write!(f, "• {}", text),
            OutputLine::SubBullet(text) => write!(f, "   ◦ {}", text),
            OutputLine::Subheading(text) => write!(f, "\n🔸 {}", text),
            OutputLine::Text(text) => f.write_str(text),
        }
    }
}

/// Joins output lines into the final section value.
pub fn render(lines: &[OutputLine]) -> String {
    let joined = lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    joined.trim().to_string()
}

/// Finite-state assembler turning classified lines into section output.
#[derive(Debug, Default)]
pub struct SectionAssembler {
    state: BulletState,
    pending: Option<String>,
    lines: Vec<OutputLine>,
}

impl SectionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn state(&self) -> BulletState {
        self.state
    }

    /// Classifies `line` and applies the matching transition.
    pub fn push_line<'a>(&mut self, line: &'a str) -> LineKind<'a> {
        let kind = classify_line(line);
        match &kind {
            LineKind::Noise => {}
            LineKind::Instruction => {
                tracing::debug!("Skipping instruction: {}", line.trim());
            }
            LineKind::Subheading(heading) => {
                self.flush();
                let text = heading.replace(':', "").trim().to_uppercase();
                self.lines.push(OutputLine::Subheading(text));
                self.state = BulletState::Plain;
            }
            LineKind::Bullet(text) => {
                self.flush();
                self.pending = Some(text.trim().to_string());
                self.state = BulletState::InBullet;
            }
            LineKind::SubBullet(text) => {
                self.flush();
                self.lines.push(OutputLine::SubBullet(text.to_string()));
                if self.state != BulletState::Plain {
                    self.state = BulletState::InSubBullet;
                }
            }
            LineKind::Text(text) => self.push_text(text),
        }
        kind
    }

    fn push_text(&mut self, text: &str) {
        match self.state {
            BulletState::InBullet => {
                if let Some(acc) = self.pending.as_mut() {
                    append_words(acc, text);
                    return;
                }
            }
            BulletState::InSubBullet => {
                tracing::debug!("Dropping text after sub-bullet: {}", text);
                return;
            }
            BulletState::Plain => {}
        }
        self.lines.push(OutputLine::Text(text.to_string()));
    }

    /// Moves the accumulating bullet, if any, into the output.
    fn flush(&mut self) {
        if let Some(acc) = self.pending.take() {
            if !acc.is_empty() {
                self.lines.push(OutputLine::Bullet(acc));
            }
        }
    }

    /// Flushes the final bullet and returns the emitted lines.
    pub fn finish(mut self) -> Vec<OutputLine> {
        self.flush();
        self.lines
    }
}

fn append_words(acc: &mut String, text: &str) {
    if !acc.is_empty() {
        acc.push(' ');
    }
    acc.push_str(text);
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(lines: &[&str]) -> Vec<OutputLine> {
        let mut assembler = SectionAssembler::new();
        for line in lines {
            assembler.push_line(line);
        }
        assembler.finish()
    }

    #[test]
    fn test_classify_line_kinds() {
        assert_eq!(classify_line("  • Lead a team "), LineKind::Bullet("Lead a team"));
        assert_eq!(classify_line("\u{F0B7} Own budget"), LineKind::Bullet("Own budget"));
        assert_eq!(classify_line("– Travel 20%"), LineKind::Bullet("Travel 20%"));
        assert_eq!(classify_line("o  Vendor reviews"), LineKind::SubBullet("Vendor reviews"));
        assert_eq!(classify_line("▪ Audits"), LineKind::SubBullet("Audits"));
        assert_eq!(
            classify_line("Implementation Leadership:"),
            LineKind::Subheading("Implementation Leadership:")
        );
        assert_eq!(classify_line("Works closely with QA."), LineKind::Text("Works closely with QA."));
    }

    #[test]
    fn test_classify_noise_and_instructions() {
        assert_eq!(classify_line("ab"), LineKind::Noise);
        assert_eq!(classify_line("Approved by HR"), LineKind::Noise);
        assert_eq!(classify_line("Page 3 of 10"), LineKind::Noise);
        assert_eq!(
            classify_line("Summarize the primary purpose & key accountabilities of the job"),
            LineKind::Instruction
        );
        assert_eq!(
            classify_line("(Not all roles will have non-standard work schedule requirements)"),
            LineKind::Instruction
        );
    }

    #[test]
    fn test_sub_bullet_keeps_leading_o_of_text() {
        assert_eq!(classify_line("o ongoing support"), LineKind::SubBullet("ongoing support"));
    }

    #[test]
    fn test_soft_wrapped_bullet_is_merged() {
        let out = assemble(&["• Lead a team", "of 5", "• Report weekly"]);
        assert_eq!(
            out,
            vec![
                OutputLine::Bullet("Lead a team of 5".to_string()),
                OutputLine::Bullet("Report weekly".to_string()),
            ]
        );
    }

    #[test]
    fn test_subheading_flushes_and_resets_state() {
        let mut assembler = SectionAssembler::new();
        assembler.push_line("• Drive roadmap");
        assert_eq!(assembler.state(), BulletState::InBullet);
        assembler.push_line("Implementation Leadership:");
        assert_eq!(assembler.state(), BulletState::Plain);
        assembler.push_line("Owns rollout plans.");
        let out = assembler.finish();
        assert_eq!(
            out,
            vec![
                OutputLine::Bullet("Drive roadmap".to_string()),
                OutputLine::Subheading("IMPLEMENTATION LEADERSHIP".to_string()),
                OutputLine::Text("Owns rollout plans.".to_string()),
            ]
        );
    }

    #[test]
    fn test_sub_bullets_emit_directly_without_wraps() {
        let mut assembler = SectionAssembler::new();
        assembler.push_line("• Manage vendors");
        assembler.push_line("o Contract reviews");
        assert_eq!(assembler.state(), BulletState::InSubBullet);
        assembler.push_line("and renewals");
        assembler.push_line("▪ Audits");
        let out = assembler.finish();
        assert_eq!(
            out,
            vec![
                OutputLine::Bullet("Manage vendors".to_string()),
                OutputLine::SubBullet("Contract reviews".to_string()),
                OutputLine::SubBullet("Audits".to_string()),
            ]
        );
    }

    #[test]
    fn test_plain_sentences_without_bullets() {
        let out = assemble(&["First sentence here.", "o Side note", "Second sentence."]);
        assert_eq!(
            out,
            vec![
                OutputLine::Text("First sentence here.".to_string()),
                OutputLine::SubBullet("Side note".to_string()),
                OutputLine::Text("Second sentence.".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_formats_each_kind() {
        let lines = vec![
            OutputLine::Text("Intro".to_string()),
            OutputLine::Bullet("One".to_string()),
            OutputLine::SubBullet("Nested".to_string()),
            OutputLine::Subheading("NEXT".to_string()),
            OutputLine::Bullet("Two".to_string()),
        ];
        assert_eq!(render(&lines), "Intro\n• One\n   ◦ Nested\n\n🔸 NEXT\n• Two");
    }

    #[test]
    fn test_render_trims_both_ends() {
        let lines = vec![OutputLine::Subheading("SCOPE".to_string())];
        assert_eq!(render(&lines), "🔸 SCOPE");
        assert_eq!(render(&[]), "");

        let lines = vec![
            OutputLine::SubBullet("Nested first".to_string()),
            OutputLine::Bullet("Top".to_string()),
        ];
        assert_eq!(render(&lines), "◦ Nested first\n• Top");
    }
}
