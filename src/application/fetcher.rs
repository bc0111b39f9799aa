//! CSV export download.

use url::Url;

use crate::domain::{AppError, Credential, RemoteFileRef, Result, TabSelector};
use crate::infrastructure::DriveClient;

/// Hint shown when an export fails while a sheet gid was requested.
const TAB_HINT: &str = "Maybe --gid is wrong?";

/// Builds and issues export requests.
pub struct ExportFetcher<'a> {
    drive: &'a DriveClient,
}

impl<'a> ExportFetcher<'a> {
    #[must_use]
    pub const fn new(drive: &'a DriveClient) -> Self {
        Self { drive }
    }

    /// Downloads the file as CSV, returning the payload untouched.
    ///
    /// # Errors
    /// Returns `ExportUnavailable` when the file has no CSV export link and
    /// `Http` on any non-200 answer. Nothing is retried.
    pub async fn fetch(
        &self,
        file: &RemoteFileRef,
        tab: &TabSelector,
        credential: &Credential,
    ) -> Result<Vec<u8>> {
        let url = export_url(file, tab)?;
        tracing::info!(file = %file.id, gid = ?tab.gid(), "Downloading export");

        let download = self.drive.download(url, credential).await?;
        if download.status != 200 {
            return Err(AppError::Http {
                status: download.status,
                action: format!("exporting '{}'", file.name),
                hint: tab.gid().map(|_| TAB_HINT.to_string()),
            });
        }

        Ok(download.body)
    }
}

/// The file's CSV export link, with `gid` appended when a tab is selected.
///
/// # Errors
/// Returns `ExportUnavailable` if there is no usable CSV link.
pub fn export_url(file: &RemoteFileRef, tab: &TabSelector) -> Result<Url> {
    let unavailable = || AppError::ExportUnavailable {
        id: file.id.clone(),
        name: file.name.clone(),
    };

    let link = file.csv_export_link().ok_or_else(unavailable)?;
    let mut url = Url::parse(link).map_err(|e| {
        tracing::debug!("Unparseable export link {}: {}", link, e);
        unavailable()
    })?;

    if let Some(gid) = tab.gid() {
        url.query_pairs_mut().append_pair("gid", gid);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_with, MockDrive};
    use reqwest::Client;
    use std::collections::HashMap;

    fn file_with_link(link: &str) -> RemoteFileRef {
        RemoteFileRef {
            id: "f1".into(),
            name: "Strings".into(),
            mime_type: None,
            export_links: HashMap::from([("text/csv".to_string(), link.to_string())]),
        }
    }

    async fn listed_file(mock: &MockDrive) -> (DriveClient, RemoteFileRef) {
        let router_mock = mock.clone();
        let base = spawn_with(move |base| router_mock.router(base)).await;
        let drive = DriveClient::new(Client::new(), base, 10);
        let credential = Credential::issued("token", None, Some(3600));
        let page = drive.list_page(&credential, None).await.unwrap();
        (drive, page.files[0].clone())
    }

    #[test]
    fn test_export_url_appends_gid() {
        let file = file_with_link("https://docs.example.com/export?id=f1&exportFormat=csv");

        let default_tab = export_url(&file, &TabSelector::default()).unwrap();
        assert_eq!(default_tab.as_str(), "https://docs.example.com/export?id=f1&exportFormat=csv");

        let tab = export_url(&file, &TabSelector::new(Some("123".into()))).unwrap();
        assert_eq!(
            tab.as_str(),
            "https://docs.example.com/export?id=f1&exportFormat=csv&gid=123"
        );
    }

    #[test]
    fn test_export_url_requires_csv_link() {
        let mut file = file_with_link("https://docs.example.com/export");
        file.export_links.clear();
        assert!(matches!(
            export_url(&file, &TabSelector::default()),
            Err(AppError::ExportUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_exact_bytes_with_bearer() {
        let payload = "key,de\ngreeting,\"Grüß Gott\"\r\n".as_bytes();
        let mock = MockDrive::new(vec![vec![("f1", "Strings")]]).export_body(payload);
        let (drive, file) = listed_file(&mock).await;
        let credential = Credential::issued("access-123", None, Some(3600));

        let bytes = ExportFetcher::new(&drive)
            .fetch(&file, &TabSelector::new(Some("7".into())), &credential)
            .await
            .unwrap();

        assert_eq!(bytes, payload);
        let requests = mock.export_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].file_id, "f1");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer access-123"));
        assert_eq!(requests[0].gid.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_fetch_failure_hints_at_gid() {
        let mock = MockDrive::new(vec![vec![("f1", "Strings")]]).export_status(400);
        let (drive, file) = listed_file(&mock).await;
        let credential = Credential::issued("token", None, Some(3600));
        let fetcher = ExportFetcher::new(&drive);

        let with_tab = fetcher
            .fetch(&file, &TabSelector::new(Some("999".into())), &credential)
            .await
            .unwrap_err();
        assert!(matches!(with_tab, AppError::Http { status: 400, .. }));
        assert!(with_tab.to_string().contains(TAB_HINT));

        let without_tab = fetcher
            .fetch(&file, &TabSelector::default(), &credential)
            .await
            .unwrap_err();
        assert!(!without_tab.to_string().contains(TAB_HINT));
        assert_eq!(mock.export_requests().len(), 2, "no retries");
    }
}
