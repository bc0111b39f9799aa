//! Application configuration model.
//!
//! Every field has a serde default so a partial (or missing) config file
//! still yields a usable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// OAuth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Client secret descriptor downloaded from the API console.
    #[serde(default = "default_client_secret_path")]
    pub client_secret_path: PathBuf,

    /// Where the credential is persisted (defaults to the data directory).
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// OAuth scopes requested during consent.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secret_path: default_client_secret_path(),
            token_path: None,
            scopes: default_scopes(),
        }
    }
}

fn default_client_secret_path() -> PathBuf {
    PathBuf::from("client_secret.json")
}

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/drive".to_string()]
}

/// Drive API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Base URL of the Drive v3 REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Files requested per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            page_size: default_page_size(),
        }
    }
}

fn default_api_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

const fn default_page_size() -> u32 {
    100
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Sheet gid used when `--gid` is not given.
    #[serde(default)]
    pub default_tab: Option<String>,

    /// Scratch file holding the downloaded CSV.
    #[serde(default = "default_scratch_file")]
    pub scratch_file: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_tab: None,
            scratch_file: default_scratch_file(),
        }
    }
}

fn default_scratch_file() -> PathBuf {
    PathBuf::from("tmp.csv")
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination directory for generated resources.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Language codes, in spreadsheet column order.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            languages: default_languages(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./")
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sheet-localizer")
    }

    /// Get the persisted credential path.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.auth
            .token_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join("token.json"))
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.auth.client_secret_path, PathBuf::from("client_secret.json"));
        assert_eq!(config.drive.page_size, 100);
        assert_eq!(config.export.scratch_file, PathBuf::from("tmp.csv"));
        assert_eq!(config.output.languages, vec!["en".to_string()]);
        assert!(config.export.default_tab.is_none());
    }

    #[test]
    fn test_token_path_follows_data_dir() {
        let mut config = AppConfig::default();
        config.paths.data_dir = Some(PathBuf::from("/tmp/localizer"));
        assert_eq!(config.token_path(), PathBuf::from("/tmp/localizer/token.json"));

        config.auth.token_path = Some(PathBuf::from("/elsewhere/token.json"));
        assert_eq!(config.token_path(), PathBuf::from("/elsewhere/token.json"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[output]\nlanguages = [\"en\", \"fr\"]\n").unwrap();
        assert_eq!(config.output.languages.len(), 2);
        assert_eq!(config.output.path, PathBuf::from("./"));
        assert_eq!(config.drive.api_base, "https://www.googleapis.com/drive/v3");
    }
}
