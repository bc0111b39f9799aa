//! Routes the staged CSV to the converter for the selected platform.

use std::path::Path;

use crate::domain::{AppError, ConversionReport, Platform, Result};
use crate::infrastructure::{write_android_strings, write_apple_strings, TranslationSheet};

/// Converts the staged CSV into resources for `platform` under `output_dir`.
///
/// `languages` lists the language codes in spreadsheet column order.
///
/// # Errors
/// Returns error if no language is given, the CSV cannot be parsed, or the
/// converter fails to write its output.
pub fn convert(
    platform: Platform,
    staged_path: &Path,
    output_dir: &Path,
    languages: &[String],
) -> Result<ConversionReport> {
    if languages.is_empty() {
        return Err(AppError::Config {
            message: "at least one language is required".into(),
        });
    }

    let sheet = TranslationSheet::from_path(staged_path)?;
    tracing::info!(%platform, languages = ?languages, rows = sheet.rows.len(), "Converting");

    match platform {
        Platform::Ios => write_apple_strings(&sheet, output_dir, languages),
        Platform::Android => write_android_strings(&sheet, output_dir, languages),
    }
}

/// Splits a comma-separated language list, dropping blanks.
#[must_use]
pub fn parse_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
