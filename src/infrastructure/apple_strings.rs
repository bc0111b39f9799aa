//! Apple `Localizable.strings` writer.
//!
//! Produces `Base.lproj` (mirroring the first language) plus one
//! `<lang>.lproj` folder per language.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{AppError, ConversionReport, Result};

use super::translation_sheet::TranslationSheet;

const TABLE_NAME: &str = "Localizable.strings";
const BASE_DIR: &str = "Base.lproj";

/// Writes one strings table per language under `output_dir`.
///
/// # Errors
/// Returns error if a directory or file cannot be created.
pub fn write_apple_strings(
    sheet: &TranslationSheet,
    output_dir: &Path,
    languages: &[String],
) -> Result<ConversionReport> {
    let mut report = ConversionReport::default();

    let mut targets: Vec<(String, usize)> = Vec::with_capacity(languages.len() + 1);
    if !languages.is_empty() {
        targets.push((BASE_DIR.to_string(), 0));
    }
    targets.extend(
        languages
            .iter()
            .enumerate()
            .map(|(column, language)| (format!("{language}.lproj"), column)),
    );

    for (dir_name, column) in targets {
        let dir = output_dir.join(&dir_name);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::io(format!("Failed to create {}", dir.display()), e))?;

        let path = dir.join(TABLE_NAME);
        let file = fs::File::create(&path)
            .map_err(|e| AppError::io(format!("Failed to create {}", path.display()), e))?;
        let mut out = BufWriter::new(file);

        let mut written = 0usize;
        for row in &sheet.rows {
            let value = row.value(column);
            if row.key.is_empty() || value.is_empty() {
                continue;
            }
            writeln!(out, "\"{}\"=\"{}\";", row.key, escape_value(value))
                .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;
            written += 1;
        }
        out.flush()
            .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

        tracing::debug!(path = %path.display(), entries = written, "Wrote strings table");
        report.entries += written;
        report.files.push(path);
    }

    Ok(report)
}

/// Escapes double quotes and collapses a literal `\\n` to `\n`.
fn escape_value(value: &str) -> String {
    value.replace('"', "\\\"").replace("\\\\n", "\\n")
}
