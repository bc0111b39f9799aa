//! Domain models for the export pipeline.
//!
//! These models represent the credential, the Drive catalog entries and the
//! selectors that drive a single localization run.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::AppError;

/// MIME type requested from the export links.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Seconds before the real expiry at which a token is treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth access credential persisted between runs.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token attached to API requests.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from a token endpoint answer.
    #[must_use]
    pub fn issued(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// Whether the access token must not be used as-is.
    ///
    /// An unknown expiry counts as expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry check against an explicit instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty()
            || self
                .expires_at
                .is_none_or(|at| at - Duration::seconds(EXPIRY_SKEW_SECS) <= now)
    }

    /// Whether the credential can be renewed without user consent.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A file entry as listed by Drive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileRef {
    /// Server-assigned identifier.
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Export URL per MIME type.
    #[serde(default)]
    pub export_links: HashMap<String, String>,
}

impl RemoteFileRef {
    /// The CSV export URL, when the file is exportable.
    #[must_use]
    pub fn csv_export_link(&self) -> Option<&str> {
        self.export_links.get(CSV_MIME_TYPE).map(String::as_str)
    }
}

/// Flattened catalog listing.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Files in catalog order.
    pub files: Vec<RemoteFileRef>,
    /// Set when a later page failed and the listing was cut short.
    pub incomplete: bool,
}

/// Sheet (tab) selector for the export request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabSelector(Option<String>);

impl TabSelector {
    #[must_use]
    pub fn new(gid: Option<String>) -> Self {
        Self(gid.filter(|g| !g.trim().is_empty()))
    }

    /// The `gid` value, if one was chosen.
    #[must_use]
    pub fn gid(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Localization output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// `Localizable.strings` tables in `*.lproj` folders.
    #[default]
    Ios,
    /// `strings.xml` resources in `values*` folders.
    Android,
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            _ => Err(AppError::UnsupportedPlatform {
                platform: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ios => write!(f, "ios"),
            Self::Android => write!(f, "android"),
        }
    }
}

/// Outcome of one converter invocation.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Resource files written.
    pub files: Vec<PathBuf>,
    /// Entries written across all files.
    pub entries: usize,
    /// Rows rejected by the converter.
    pub skipped: usize,
}

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unauthenticated,
    Authenticated,
    FileResolved,
    Fetched,
    Staged,
    Converted,
    CleanedUp,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::FileResolved => "file-resolved",
            Self::Fetched => "fetched",
            Self::Staged => "staged",
            Self::Converted => "converted",
            Self::CleanedUp => "cleaned-up",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_expiry() {
        let fresh = Credential::issued("token", None, Some(3600));
        assert!(!fresh.is_expired());

        let almost = Credential::issued("token", None, Some(30));
        assert!(almost.is_expired(), "within skew window counts as expired");

        let unknown = Credential {
            access_token: "token".into(),
            refresh_token: None,
            expires_at: None,
        };
        assert!(unknown.is_expired());
    }

    #[test]
    fn test_credential_debug_redacts_tokens() {
        let cred = Credential::issued("secret-access", Some("secret-refresh".into()), Some(10));
        let debug = format!("{cred:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_can_refresh() {
        let mut cred = Credential::issued("a", Some(String::new()), None);
        assert!(!cred.can_refresh());
        cred.refresh_token = Some("r".into());
        assert!(cred.can_refresh());
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("Android".parse::<Platform>().unwrap(), Platform::Android);
        assert!(matches!(
            "web".parse::<Platform>(),
            Err(AppError::UnsupportedPlatform { platform }) if platform == "web"
        ));
    }

    #[test]
    fn test_tab_selector_ignores_blank() {
        assert!(TabSelector::new(Some("  ".into())).gid().is_none());
        assert_eq!(TabSelector::new(Some("42".into())).gid(), Some("42"));
    }

    #[test]
    fn test_remote_file_deserializes_drive_shape() {
        let json = r#"{
            "id": "1abc",
            "name": "Translations",
            "mimeType": "application/vnd.google-apps.spreadsheet",
            "exportLinks": {"text/csv": "https://docs.google.com/export?id=1abc&exportFormat=csv"}
        }"#;
        let file: RemoteFileRef = serde_json::from_str(json).unwrap();
        assert_eq!(file.name, "Translations");
        assert!(file.csv_export_link().unwrap().contains("exportFormat=csv"));
    }
}
