//! End-to-end localization run.
//!
//! authorize -> resolve file -> export CSV -> stage -> convert -> clean up.
//! Stages run strictly in order; the first failure ends the run and the
//! staged CSV (if any) is removed on the way out.

use std::io::Write;
use std::path::PathBuf;

use reqwest::Client;
use url::Url;

use crate::domain::{
    AppConfig, AppError, ConversionReport, Credential, PipelineState, Platform, RemoteFileRef,
    Result, TabSelector,
};
use crate::infrastructure::{ClientSecret, CredentialStore, DriveClient, OAuthClient, StagingArea};

use super::catalog::RemoteFileCatalog;
use super::converter::convert;
use super::fetcher::ExportFetcher;

/// Remote-facing services built from configuration.
pub struct Services {
    pub store: CredentialStore,
    pub drive: DriveClient,
}

impl Services {
    /// Wires the credential store and Drive client.
    ///
    /// # Errors
    /// Returns `AuthConfigMissing` or `AuthFlowFailed` if the client secret
    /// cannot be loaded.
    pub fn from_config(config: &AppConfig, http: Client) -> Result<Self> {
        let secret = ClientSecret::load(&config.auth.client_secret_path)?;
        let oauth = OAuthClient::new(http.clone(), secret, config.auth.scopes.clone());

        Ok(Self {
            store: CredentialStore::new(config.token_path(), oauth),
            drive: DriveClient::new(http, config.drive.api_base.clone(), config.drive.page_size),
        })
    }
}

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// File to export; prompts when absent.
    pub file_id: Option<String>,
    /// Raw platform selector, validated before any network call.
    pub platform: String,
    pub output: PathBuf,
    pub tab: TabSelector,
    pub keep_csv: bool,
    pub languages: Vec<String>,
    pub scratch_file: PathBuf,
}

impl RunOptions {
    /// Options taken from configuration alone.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            file_id: None,
            platform: Platform::default().to_string(),
            output: config.output.path.clone(),
            tab: TabSelector::new(config.export.default_tab.clone()),
            keep_csv: false,
            languages: config.output.languages.clone(),
            scratch_file: config.export.scratch_file.clone(),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub file: RemoteFileRef,
    pub platform: Platform,
    pub output: PathBuf,
    pub report: ConversionReport,
    /// Location of the CSV when it was kept.
    pub kept_csv: Option<PathBuf>,
}

/// Runs the stages in order and tracks where the run is.
///
/// Progress lines go to `out`.
pub struct Pipeline<W: Write> {
    config: AppConfig,
    http: Client,
    out: W,
    state: PipelineState,
}

impl<W: Write> Pipeline<W> {
    #[must_use]
    pub const fn new(config: AppConfig, http: Client, out: W) -> Self {
        Self {
            config,
            http,
            out,
            state: PipelineState::Unauthenticated,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Executes a full run.
    ///
    /// `present` shows the consent URL if authorization needs the user;
    /// `choose` picks a file when no id was given.
    ///
    /// # Errors
    /// Returns the error of the first failing stage. The state is then
    /// [`PipelineState::Failed`].
    pub async fn run<P, C>(&mut self, options: RunOptions, present: P, choose: C) -> Result<RunSummary>
    where
        P: FnOnce(&Url),
        C: FnOnce(&[RemoteFileRef]) -> Result<usize>,
    {
        let result = self.execute(options, present, choose).await;
        if let Err(e) = &result {
            tracing::error!(stage = %self.state, "Run failed: {}", e);
            self.state = PipelineState::Failed;
        }
        result
    }

    async fn execute<P, C>(&mut self, options: RunOptions, present: P, choose: C) -> Result<RunSummary>
    where
        P: FnOnce(&Url),
        C: FnOnce(&[RemoteFileRef]) -> Result<usize>,
    {
        let platform: Platform = options.platform.parse()?;
        if options.languages.is_empty() {
            return Err(AppError::Config {
                message: "at least one language is required".into(),
            });
        }
        let services = Services::from_config(&self.config, self.http.clone())?;

        self.say("Authorizing...")?;
        let mut credential = services.store.acquire(present).await?;
        self.advance(PipelineState::Authenticated);

        self.say("Listing files...")?;
        let file = RemoteFileCatalog::new(&services.drive)
            .resolve(&credential, options.file_id.as_deref(), choose)
            .await?;
        self.advance(PipelineState::FileResolved);

        let bytes = self
            .download(&services, &file, &options.tab, &mut credential)
            .await?;
        self.advance(PipelineState::Fetched);

        let staged = StagingArea::new(options.scratch_file.clone(), options.keep_csv).stage(&bytes)?;
        self.advance(PipelineState::Staged);

        // A failed conversion drops `staged`, which removes the scratch file.
        let report = convert(platform, staged.path(), &options.output, &options.languages)?;
        self.advance(PipelineState::Converted);

        let kept_csv = options.keep_csv.then(|| staged.path().to_path_buf());
        staged.release()?;
        self.advance(PipelineState::CleanedUp);

        Ok(RunSummary {
            file,
            platform,
            output: options.output,
            report,
            kept_csv,
        })
    }

    async fn download(
        &mut self,
        services: &Services,
        file: &RemoteFileRef,
        tab: &TabSelector,
        credential: &mut Credential,
    ) -> Result<Vec<u8>> {
        // Consent and listing may take long enough for the token to lapse.
        services.store.ensure_fresh(credential).await?;

        match tab.gid() {
            Some(gid) => self.say(&format!("Downloading '{}' (gid {gid})...", file.name))?,
            None => self.say(&format!("Downloading '{}'...", file.name))?,
        }
        ExportFetcher::new(&services.drive)
            .fetch(file, tab, credential)
            .await
    }

    fn advance(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "Pipeline stage");
        self.state = next;
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}").map_err(|e| AppError::io("Failed to write progress", e))
    }
}
