//! Configuration file management.
//!
//! Handles loading the optional TOML configuration file and writing the
//! documented default.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# sheet-localizer configuration
# Auto-generated - edit as needed. Command-line flags take precedence.

[auth]
# OAuth client secret downloaded from the Google API console
client_secret_path = "client_secret.json"

# Where the OAuth token is stored (defaults to ~/.sheet-localizer/token.json)
# token_path = "/custom/token.json"

scopes = ["https://www.googleapis.com/auth/drive"]

[drive]
api_base = "https://www.googleapis.com/drive/v3"

# Files requested per listing page
page_size = 100

[export]
# Sheet gid exported when --gid is not given (first sheet when unset)
# default_tab = "0"

# Scratch file the CSV is downloaded to
scratch_file = "tmp.csv"

[output]
# Destination for the *.lproj / values* folders
path = "./"

# Language codes in spreadsheet column order (column 1 = first language)
languages = ["en"]

[paths]
# Custom data directory (optional, defaults to ~/.sheet-localizer)
# data_dir = "/custom/path"
"#;

/// Load configuration from an explicit file, the default location, or defaults.
///
/// An explicitly requested file must exist.
///
/// # Errors
/// Returns error if a file exists but cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from_file(path);
    }

    let config_path = config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns `true` when a file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default_data_dir().join("config.toml")
}
