//! CLI interface using clap.
//!
//! Without a subcommand the tool runs the full export and conversion.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Sheet Localizer - Turn a Google Sheets translation table into iOS or
/// Android localization files.
#[derive(Parser, Debug)]
#[command(name = "sheet-localizer")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ~/.sheet-localizer/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags of the default export run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Id of the spreadsheet to export (prompts with a file list if omitted).
    #[arg(long)]
    pub id: Option<String>,

    /// Output directory for the generated resources.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Target platform: ios or android.
    #[arg(long, default_value = "ios")]
    pub platform: String,

    /// Sheet (tab) gid to export instead of the first sheet.
    #[arg(long)]
    pub gid: Option<String>,

    /// Keep the downloaded CSV file after conversion.
    #[arg(long)]
    pub keep_csv: bool,

    /// Comma-separated language codes in column order, e.g. "en,fr,de".
    #[arg(long)]
    pub languages: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the files visible to the account.
    Files,

    /// Authorize (or refresh the stored credential) and show its status.
    Auth,

    /// Show configuration, credential and scratch paths.
    Paths {
        /// Write the default configuration file if none exists.
        #[arg(long)]
        init: bool,
    },
}
