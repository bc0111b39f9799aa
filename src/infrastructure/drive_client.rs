//! Google Drive v3 REST client.
//!
//! Only the two calls the pipeline needs: one page of `files.list` and a
//! bearer-authorized GET of an export link.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::{AppError, Credential, RemoteFileRef, Result};

/// Fields requested from `files.list`.
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, exportLinks)";

/// One page of `files.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    #[serde(default)]
    pub files: Vec<RemoteFileRef>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Drive's JSON error envelope.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Raw export answer; the caller decides what a failure means.
#[derive(Debug)]
pub struct Download {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Thin Drive API wrapper.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Client,
    api_base: String,
    page_size: u32,
}

impl DriveClient {
    #[must_use]
    pub fn new(http: Client, api_base: impl Into<String>, page_size: u32) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            page_size,
        }
    }

    /// Fetches one listing page.
    ///
    /// # Errors
    /// Returns `Http` on a non-success status, `Network` on transport failure.
    pub async fn list_page(
        &self,
        credential: &Credential,
        page_token: Option<&str>,
    ) -> Result<FilePage> {
        let mut request = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&credential.access_token)
            .query(&[
                ("fields", LIST_FIELDS.to_string()),
                ("pageSize", self.page_size.to_string()),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(AppError::network)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Http {
                status: status.as_u16(),
                action: "listing files".into(),
                hint: api_error_message(&body),
            });
        }

        let page: FilePage = response.json().await.map_err(AppError::network)?;
        tracing::debug!(
            files = page.files.len(),
            has_next = page.next_page_token.is_some(),
            "Fetched listing page"
        );
        Ok(page)
    }

    /// GETs `url` with the credential attached.
    ///
    /// # Errors
    /// Returns `Network` if the request cannot be completed.
    pub async fn download(&self, url: Url, credential: &Credential) -> Result<Download> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(AppError::network)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(AppError::network)?.to_vec();

        tracing::debug!(status, bytes = body.len(), "Download finished");
        Ok(Download { status, body })
    }
}

/// Extracts `error.message` from a Drive error body.
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_with, MockDrive};

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":403,"message":"Insufficient Permission"}}"#;
        assert_eq!(api_error_message(body).as_deref(), Some("Insufficient Permission"));
        assert_eq!(api_error_message("<html>"), None);
    }

    #[tokio::test]
    async fn test_list_page_follows_token() {
        let mock = MockDrive::new(vec![vec![("a", "First")], vec![("b", "Second")]]);
        let drive_mock = mock.clone();
        let base = spawn_with(move |base| drive_mock.router(base)).await;
        let client = DriveClient::new(Client::new(), format!("{base}/"), 10);
        let credential = Credential::issued("token", None, Some(3600));

        let first = client.list_page(&credential, None).await.unwrap();
        assert_eq!(first.files[0].id, "a");
        let token = first.next_page_token.unwrap();

        let second = client.list_page(&credential, Some(&token)).await.unwrap();
        assert_eq!(second.files[0].id, "b");
        assert!(second.next_page_token.is_none());
        assert_eq!(mock.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_list_page_error_status() {
        let mock = MockDrive::new(vec![vec![("a", "First")]]).failing_page(0);
        let base = spawn_with(move |base| mock.router(base)).await;
        let client = DriveClient::new(Client::new(), base, 10);
        let credential = Credential::issued("token", None, Some(3600));

        let err = client.list_page(&credential, None).await.unwrap_err();
        assert!(matches!(err, AppError::Http { status: 500, .. }));
        assert!(err.to_string().contains("backend error"));
    }
}
