//! CSV translation table as exported from the spreadsheet.
//!
//! Layout: a header row, then one row per string. Column 0 holds the key,
//! column `i + 1` the value for the `i`-th configured language.

use std::io::Read;
use std::path::Path;

use crate::domain::{AppError, Result};

/// One translatable string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub key: String,
    pub values: Vec<String>,
}

impl TranslationRow {
    /// Value for the language at `index`, empty when the cell is missing.
    #[must_use]
    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map_or("", String::as_str)
    }
}

/// Parsed translation table.
#[derive(Debug, Clone, Default)]
pub struct TranslationSheet {
    pub rows: Vec<TranslationRow>,
}

impl TranslationSheet {
    /// Reads the staged CSV file.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or is not valid CSV.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| AppError::io(format!("Failed to open {}", path.display()), e))?;
        Self::from_reader(file)
    }

    /// Parses CSV from any reader.
    ///
    /// # Errors
    /// Returns error if the content is not valid UTF-8 CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(AppError::csv)?;
            let mut fields = record.iter().map(str::to_string);
            let Some(key) = fields.next() else {
                continue;
            };
            rows.push(TranslationRow {
                key,
                values: fields.collect(),
            });
        }

        tracing::debug!(rows = rows.len(), "Parsed translation sheet");
        Ok(Self { rows })
    }
}
