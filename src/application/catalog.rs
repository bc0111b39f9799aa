//! Remote file catalog.
//!
//! Flattens Drive's paginated listing and resolves the file to export,
//! either by id or by asking the user.

use crate::domain::{AppError, Credential, Listing, RemoteFileRef, Result};
use crate::infrastructure::DriveClient;

/// Catalog view over the user's Drive files.
pub struct RemoteFileCatalog<'a> {
    drive: &'a DriveClient,
}

impl<'a> RemoteFileCatalog<'a> {
    #[must_use]
    pub const fn new(drive: &'a DriveClient) -> Self {
        Self { drive }
    }

    /// Lists every file, following continuation tokens until exhausted.
    ///
    /// A failure after the first page truncates the listing instead of
    /// failing it; the result is then marked `incomplete`.
    ///
    /// # Errors
    /// Returns error if the first page cannot be fetched.
    pub async fn list(&self, credential: &Credential) -> Result<Listing> {
        let mut listing = Listing::default();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = match self.drive.list_page(credential, page_token.as_deref()).await {
                Ok(page) => page,
                Err(e) if pages > 0 => {
                    tracing::warn!(
                        pages,
                        files = listing.files.len(),
                        "File listing truncated: {}",
                        e
                    );
                    listing.incomplete = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            pages += 1;
            listing.files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::info!(pages, files = listing.files.len(), "Listed remote files");
        Ok(listing)
    }

    /// Resolves the target file.
    ///
    /// With an id, the listing is searched for an exact match. Without one,
    /// `choose` picks an index from the listing.
    ///
    /// # Errors
    /// Returns `FileNotFound` for an unknown id, `EmptyCatalog` when there is
    /// nothing to choose from, or whatever `choose` fails with.
    pub async fn resolve<C>(
        &self,
        credential: &Credential,
        file_id: Option<&str>,
        choose: C,
    ) -> Result<RemoteFileRef>
    where
        C: FnOnce(&[RemoteFileRef]) -> Result<usize>,
    {
        let listing = self.list(credential).await?;
        if listing.incomplete {
            tracing::warn!("Choosing from an incomplete file list");
        }

        if let Some(id) = file_id {
            return listing
                .files
                .into_iter()
                .find(|f| f.id == id)
                .ok_or_else(|| AppError::FileNotFound { id: id.to_string() });
        }

        if listing.files.is_empty() {
            return Err(AppError::EmptyCatalog);
        }

        let bound = listing.files.len();
        let index = choose(&listing.files)?;
        listing
            .files
            .into_iter()
            .nth(index)
            .ok_or_else(|| AppError::InvalidSelection {
                input: index.to_string(),
                bound,
            })
    }
}
