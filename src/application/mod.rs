//! Application layer - use cases and orchestration.
//!
//! This layer resolves the remote file, fetches its CSV export and drives
//! the platform converters.

pub mod catalog;
pub mod converter;
pub mod fetcher;
pub mod formatter;
pub mod pipeline;
pub mod selection;

pub use catalog::RemoteFileCatalog;
pub use converter::parse_languages;
pub use formatter::{format_credential_status, format_files_table, format_summary};
pub use pipeline::{Pipeline, RunOptions, Services};
pub use selection::prompt_selection;
