//! Terminal output for catalog listings, credential status and run results.

use std::path::Path;

use chrono::Utc;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Credential, Listing};

use super::pipeline::RunSummary;

/// Formats the catalog as a table, one row per file in listing order.
pub fn format_files_table(listing: &Listing) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "ID", "Name", "Type", "CSV"]);

    for (index, file) in listing.files.iter().enumerate() {
        let kind = file
            .mime_type
            .as_deref()
            .map_or_else(|| "-".to_string(), short_mime);
        let csv = if file.csv_export_link().is_some() { "yes" } else { "no" };

        table.add_row(vec![
            &index.to_string(),
            &file.id,
            &truncate(&file.name, 40),
            &kind,
            csv,
        ]);
    }

    let mut out = table.to_string();
    if listing.incomplete {
        out.push_str(&format!(
            "\n{} listing is incomplete, a later page failed to load",
            "warning:".yellow().bold()
        ));
    }
    out
}

/// Formats the credential state for the `auth` command.
pub fn format_credential_status(credential: &Credential, path: &Path) -> String {
    let expiry = match credential.expires_at {
        Some(at) if at > Utc::now() => {
            let minutes = (at - Utc::now()).num_minutes();
            format!("{} (in {minutes} min)", at.format("%Y-%m-%d %H:%M:%S UTC")).green()
        }
        Some(at) => format!("{} (expired)", at.format("%Y-%m-%d %H:%M:%S UTC")).red(),
        None => "unknown".yellow(),
    };
    let refresh = if credential.can_refresh() {
        "available".green()
    } else {
        "missing".red()
    };

    format!(
        "{}\n  Token file: {}\n  Expires: {}\n  Refresh token: {}",
        "🔑 Credential".bold(),
        path.display(),
        expiry,
        refresh
    )
}

/// Formats the result of a successful run.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = format!(
        "{} Localization files for platform {} have been generated under '{}'",
        "Success!".green().bold(),
        summary.platform.to_string().cyan(),
        summary.output.display()
    );

    out.push_str(&format!(
        "\n  Source: {} ({})\n  Files written: {}\n  Entries: {}",
        summary.file.name,
        summary.file.id,
        summary.report.files.len(),
        summary.report.entries
    ));
    if summary.report.skipped > 0 {
        out.push_str(&format!(
            "\n  Skipped rows: {}",
            summary.report.skipped.to_string().yellow()
        ));
    }
    if let Some(csv) = &summary.kept_csv {
        out.push_str(&format!("\n  CSV kept at: {}", csv.display()));
    }
    out
}

/// Last segment of a MIME type, e.g. `spreadsheet` for Google Sheets.
fn short_mime(mime: &str) -> String {
    mime.rsplit(['.', '/']).next().unwrap_or(mime).to_string()
}

/// Truncates a string to max length (in chars) with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
