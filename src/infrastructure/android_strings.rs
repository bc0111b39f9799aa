//! Android `strings.xml` writer.
//!
//! `en` goes to `values/`, every other language to `values-<lang>/`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::domain::{AppError, ConversionReport, Result};

use super::translation_sheet::TranslationSheet;

const RESOURCE_FILE: &str = "strings.xml";
const DEFAULT_LANGUAGE: &str = "en";

/// Writes one `strings.xml` per language under `output_dir`.
///
/// # Errors
/// Returns error if a directory or file cannot be created.
pub fn write_android_strings(
    sheet: &TranslationSheet,
    output_dir: &Path,
    languages: &[String],
) -> Result<ConversionReport> {
    let mut report = ConversionReport::default();

    for (column, language) in languages.iter().enumerate() {
        let dir = output_dir.join(values_dir(language));
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::io(format!("Failed to create {}", dir.display()), e))?;

        let path = dir.join(RESOURCE_FILE);
        let file = fs::File::create(&path)
            .map_err(|e| AppError::io(format!("Failed to create {}", path.display()), e))?;
        let mut out = BufWriter::new(file);

        let (written, skipped) = write_resources(sheet, column, &mut out).map_err(AppError::xml)?;
        out.flush()
            .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

        tracing::debug!(path = %path.display(), entries = written, skipped, "Wrote strings.xml");
        report.entries += written;
        report.skipped += skipped;
        report.files.push(path);
    }

    Ok(report)
}

/// Folder name for a language code.
fn values_dir(language: &str) -> String {
    if language == DEFAULT_LANGUAGE {
        "values".to_string()
    } else {
        format!("values-{language}")
    }
}

fn write_resources<W: Write>(
    sheet: &TranslationSheet,
    column: usize,
    out: W,
) -> std::result::Result<(usize, usize), quick_xml::Error> {
    let mut writer = Writer::new(out);
    let mut written = 0usize;
    let mut skipped = 0usize;

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    emit(&mut writer, Event::Text(BytesText::new("\n")))?;
    emit(&mut writer, Event::Start(BytesStart::new("resources")))?;
    emit(&mut writer, Event::Text(BytesText::new("\n")))?;

    for row in &sheet.rows {
        if !is_valid_key(&row.key) {
            tracing::warn!("Invalid android key provided: {}", row.key);
            skipped += 1;
            continue;
        }

        let value = escape_value(row.value(column));
        let mut element = BytesStart::new("string");
        element.push_attribute(("name", row.key.as_str()));

        emit(&mut writer, Event::Text(BytesText::new("    ")))?;
        emit(&mut writer, Event::Start(element))?;
        // `]]>` cannot appear inside a CDATA section; such values are escaped as text.
        if has_markup(&value) && !value.contains("]]>") {
            emit(&mut writer, Event::CData(BytesCData::new(value.as_str())))?;
        } else {
            emit(&mut writer, Event::Text(BytesText::from_escaped(partial_escape(value.as_str()))))?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("string")))?;
        emit(&mut writer, Event::Text(BytesText::new("\n")))?;
        written += 1;
    }

    emit(&mut writer, Event::End(BytesEnd::new("resources")))?;
    emit(&mut writer, Event::Text(BytesText::new("\n")))?;

    Ok((written, skipped))
}

fn emit<W: Write>(
    writer: &mut Writer<W>,
    event: Event<'_>,
) -> std::result::Result<(), quick_xml::Error> {
    writer.write_event(event).map_err(quick_xml::Error::from)
}

/// Resource names: lowercase letter first, then lowercase, digits, underscores.
fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn has_markup(value: &str) -> bool {
    value.contains('<') || value.contains('>')
}

/// Applies Android string escaping (quotes, apostrophes, newlines, `%@`).
fn escape_value(value: &str) -> String {
    value
        .replace('"', "\\\"")
        .replace("\\\\n", "\\n")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace("%@", "%s")
}
