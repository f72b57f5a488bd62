// src/utils/debug_dump.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::noise::{classify_noise, NoiseRule};
use crate::utils::error::AppError;

/// Every line the normalizer drops: (1-based line number, rule, line text).
pub fn noise_report(raw: &str) -> Vec<(usize, NoiseRule, &str)> {
    raw.lines()
        .enumerate()
        .filter_map(|(idx, line)| classify_noise(line).map(|rule| (idx + 1, rule, line)))
        .collect()
}

/// Renders the noise report as one `L<n> [<rule>] <text>` line per dropped line.
pub fn format_noise_report(raw: &str) -> String {
    let mut out = String::new();
    for (line_no, rule, text) in noise_report(raw) {
        out.push_str(&format!("L{} [{}] {}\n", line_no, rule, text));
    }
    out
}

/// Saves raw text, normalized text and the noise report under `<debug_dir>/<document stem>/`.
pub fn save_debug_dump(
    debug_dir: &Path,
    source_name: &str,
    raw: &str,
    normalized: &str,
) -> Result<PathBuf, AppError> {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let target_dir = debug_dir.join(stem);
    fs::create_dir_all(&target_dir)?;

    fs::write(target_dir.join("raw.txt"), raw)?;
    fs::write(target_dir.join("normalized.txt"), normalized)?;
    fs::write(target_dir.join("noise_report.txt"), format_noise_report(raw))?;

    tracing::info!("Saved debug dump to {}", target_dir.display());
    Ok(target_dir)
}
