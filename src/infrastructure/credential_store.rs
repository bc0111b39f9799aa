//! Persisted OAuth credential.
//!
//! The credential lives in a JSON file so later runs skip the consent
//! screen. It is replaced in place on refresh and never deleted here.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::domain::{AppError, Credential, Result};

use super::oauth::OAuthClient;

/// Load/validate/refresh/persist cycle for the access credential.
pub struct CredentialStore {
    path: PathBuf,
    oauth: OAuthClient,
}

impl CredentialStore {
    #[must_use]
    pub const fn new(path: PathBuf, oauth: OAuthClient) -> Self {
        Self { path, oauth }
    }

    /// Location of the persisted credential.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a usable credential, refreshing or running consent as needed.
    ///
    /// `present` shows the authorization URL when consent is required.
    ///
    /// # Errors
    /// Returns `AuthFlowFailed` if no credential can be obtained, or an IO
    /// error if the result cannot be persisted.
    pub async fn acquire<F>(&self, present: F) -> Result<Credential>
    where
        F: FnOnce(&Url),
    {
        if let Some(stored) = self.load() {
            if !stored.is_expired() {
                tracing::debug!(path = %self.path.display(), "Using stored credential");
                return Ok(stored);
            }

            if stored.can_refresh() {
                match self.oauth.refresh(&stored).await {
                    Ok(refreshed) => {
                        self.save(&refreshed)?;
                        tracing::info!("Stored credential refreshed");
                        return Ok(refreshed);
                    }
                    Err(e) => {
                        tracing::warn!("Refreshing stored credential failed, asking for consent again: {}", e);
                    }
                }
            }
        }

        let credential = self.oauth.run_consent(present).await?;
        self.save(&credential)?;
        tracing::info!(path = %self.path.display(), "New credential stored");
        Ok(credential)
    }

    /// Refreshes `credential` in place if it expired since it was acquired.
    ///
    /// # Errors
    /// Returns `AuthFlowFailed` if the credential is expired and cannot be
    /// refreshed.
    pub async fn ensure_fresh(&self, credential: &mut Credential) -> Result<()> {
        if !credential.is_expired() {
            return Ok(());
        }

        if !credential.can_refresh() {
            return Err(AppError::auth(
                "access token expired and no refresh token is available",
            ));
        }

        let refreshed = self.oauth.refresh(credential).await?;
        self.save(&refreshed)?;
        *credential = refreshed;
        tracing::debug!("Credential refreshed before use");
        Ok(())
    }

    /// Reads the stored credential; unreadable files count as absent.
    #[must_use]
    pub fn load(&self) -> Option<Credential> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!("Ignoring malformed credential at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Writes the credential, creating the parent directory if needed.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create credential directory", e))?;
        }

        let content = serde_json::to_string_pretty(credential).map_err(AppError::json_parse)?;
        fs::write(&self.path, content).map_err(|e| {
            AppError::io(
                format!("Failed to write credential: {}", self.path.display()),
                e,
            )
        })?;

        restrict_permissions(&self.path);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::debug!("Could not restrict {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
