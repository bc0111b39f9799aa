//! Domain-level error types for sheet-localizer.
//!
//! All errors are typed with `thiserror` and carry a human-readable message,
//! since every failure ends up printed to the terminal.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// The OAuth client secret file is missing.
    #[error(
        "'{}' file does not exist.\nEnable the Drive API and save the client secret file there.\nhttps://console.developers.google.com/flows/enableapi?apiid=drive",
        path.display()
    )]
    AuthConfigMissing { path: PathBuf },

    /// The consent or refresh flow could not produce a credential.
    #[error("Authorization failed: {message}")]
    AuthFlowFailed { message: String },

    /// The requested file id is not part of the catalog listing.
    #[error(
        "File with id '{id}' not found in files list.\nNotice: you need to load the file at least once in your browser, so it's visible in your files list."
    )]
    FileNotFound { id: String },

    /// The catalog listing returned no files at all.
    #[error("No files found.")]
    EmptyCatalog,

    /// Interactive selection was not a valid index.
    #[error("Invalid index supplied: '{input}' (expected a number between 0 and {})", bound.saturating_sub(1))]
    InvalidSelection { input: String, bound: usize },

    /// The remote service answered with a non-success status.
    #[error("HTTP error: {status} while {action}{}", hint.as_deref().map(|h| format!("\n{h}")).unwrap_or_default())]
    Http {
        status: u16,
        action: String,
        hint: Option<String>,
    },

    /// The file has no CSV export link (not a spreadsheet).
    #[error("File '{name}' ({id}) cannot be exported as CSV")]
    ExportUnavailable { id: String, name: String },

    /// Unknown platform selector.
    #[error("Invalid platform '{platform}'. Use: ios, android")]
    UnsupportedPlatform { platform: String },

    /// Transport-level failure talking to a remote endpoint.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The exported CSV could not be read.
    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Writing an XML resource failed.
    #[error("XML error: {message}")]
    Xml {
        message: String,
        #[source]
        source: Option<quick_xml::Error>,
    },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create an auth flow error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthFlowFailed {
            message: message.into(),
        }
    }

    /// Create a network error from a reqwest error.
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a CSV error.
    pub fn csv(err: csv::Error) -> Self {
        Self::Csv {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an XML writer error.
    pub fn xml(err: quick_xml::Error) -> Self {
        Self::Xml {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether the error only asks the user to try again.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidSelection { .. })
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_includes_hint() {
        let err = AppError::Http {
            status: 400,
            action: "exporting file".into(),
            hint: Some("Maybe --gid is wrong?".into()),
        };
        let message = err.to_string();
        assert!(message.contains("HTTP error: 400"));
        assert!(message.ends_with("Maybe --gid is wrong?"));
    }

    #[test]
    fn test_only_selection_is_recoverable() {
        let selection = AppError::InvalidSelection {
            input: "x".into(),
            bound: 3,
        };
        assert!(selection.is_recoverable());
        assert!(!AppError::EmptyCatalog.is_recoverable());
    }

    #[test]
    fn test_xml_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = AppError::xml(quick_xml::Error::from(io));
        assert!(err.to_string().starts_with("XML error:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_file_not_found_mentions_browser() {
        let err = AppError::FileNotFound { id: "abc".into() };
        assert!(err.to_string().contains("at least once in your browser"));
    }
}
