//! Sheet Localizer - Generate iOS and Android localization files from a
//! Google Sheets translation table.
//!
//! The spreadsheet is exported as CSV through the Drive API, staged in a
//! scratch file and converted into `*.lproj/Localizable.strings` or
//! `values*/strings.xml` resources.
//!
//! QUICK START:
//!   sheet-localizer paths --init                     # Write the default config
//!   sheet-localizer files                            # List exportable files
//!   sheet-localizer --id <id> --languages en,fr      # iOS resources in ./
//!   sheet-localizer --platform android --path res/   # Pick a file interactively

mod application;
mod cli;
mod domain;
mod infrastructure;
#[cfg(test)]
mod test_support;

use std::io;

use clap::Parser;
use colored::Colorize;
use reqwest::Client;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use application::{
    format_credential_status, format_files_table, format_summary, parse_languages,
    prompt_selection, Pipeline, RemoteFileCatalog, RunOptions, Services,
};
use cli::{Cli, Commands, RunArgs};
use domain::{AppConfig, AppError, RemoteFileRef, TabSelector};
use infrastructure::{config_file_path, ensure_config_exists, load_config};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        None => cmd_run(config, cli.run).await,
        Some(Commands::Files) => cmd_files(&config).await,
        Some(Commands::Auth) => cmd_auth(&config).await,
        Some(Commands::Paths { init }) => cmd_paths(&config, cli.config, init),
    }
}

/// Export the chosen spreadsheet and convert it.
async fn cmd_run(config: AppConfig, args: RunArgs) -> domain::Result<()> {
    let options = run_options(&config, args);
    let mut pipeline = Pipeline::new(config, http_client()?, io::stdout());

    let summary = pipeline
        .run(options, present_consent_url, |files: &[RemoteFileRef]| {
            prompt_selection(files, &mut io::stdin().lock(), &mut io::stdout())
        })
        .await?;

    println!("{}", format_summary(&summary));
    Ok(())
}

/// List files command.
async fn cmd_files(config: &AppConfig) -> domain::Result<()> {
    let services = Services::from_config(config, http_client()?)?;
    let credential = services.store.acquire(present_consent_url).await?;

    let listing = RemoteFileCatalog::new(&services.drive).list(&credential).await?;
    if listing.files.is_empty() {
        return Err(AppError::EmptyCatalog);
    }

    println!("{}", format_files_table(&listing));
    println!();
    println!("Total: {} file(s)", listing.files.len());

    Ok(())
}

/// Authorize and show the credential status.
async fn cmd_auth(config: &AppConfig) -> domain::Result<()> {
    let services = Services::from_config(config, http_client()?)?;
    let credential = services.store.acquire(present_consent_url).await?;

    println!("{}", format_credential_status(&credential, services.store.path()));
    Ok(())
}

/// Show paths command.
fn cmd_paths(
    config: &AppConfig,
    explicit: Option<std::path::PathBuf>,
    init: bool,
) -> domain::Result<()> {
    let config_path = explicit.unwrap_or_else(config_file_path);

    if init {
        if ensure_config_exists(&config_path)? {
            println!("{} Wrote {}", "✓".green().bold(), config_path.display());
        } else {
            println!("{} already exists, left untouched", config_path.display());
        }
        println!();
    }

    let marker = |path: &std::path::Path| {
        if path.exists() {
            "found".green()
        } else {
            "missing".yellow()
        }
    };

    println!("{}", "📂 Sheet Localizer Paths".bold());
    println!();
    println!("  Config:        {} [{}]", config_path.display(), marker(&config_path));
    println!("  Data dir:      {}", config.data_dir().display());
    println!(
        "  Credential:    {} [{}]",
        config.token_path().display(),
        marker(&config.token_path())
    );
    println!(
        "  Client secret: {} [{}]",
        config.auth.client_secret_path.display(),
        marker(&config.auth.client_secret_path)
    );
    println!("  Scratch CSV:   {}", config.export.scratch_file.display());
    println!("  Output:        {}", config.output.path.display());

    Ok(())
}

/// Merge command-line flags over the configured defaults.
fn run_options(config: &AppConfig, args: RunArgs) -> RunOptions {
    let defaults = RunOptions::from_config(config);

    RunOptions {
        file_id: args.id,
        platform: args.platform,
        output: args.path.unwrap_or(defaults.output),
        tab: args
            .gid
            .map_or(defaults.tab, |gid| TabSelector::new(Some(gid))),
        keep_csv: args.keep_csv,
        languages: args
            .languages
            .as_deref()
            .map_or(defaults.languages, parse_languages),
        scratch_file: defaults.scratch_file,
    }
}

fn http_client() -> domain::Result<Client> {
    Client::builder()
        .user_agent(concat!("sheet-localizer/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(AppError::network)
}

fn present_consent_url(url: &Url) {
    println!("Go to the following link in your browser:");
    println!();
    println!("    {}", url.as_str().cyan());
    println!();
    println!("Waiting for authorization...");
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
