//! Infrastructure layer - external adapters (HTTP, OAuth, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod android_strings;
pub mod apple_strings;
pub mod config;
pub mod credential_store;
pub mod drive_client;
pub mod oauth;
pub mod staging;
pub mod translation_sheet;

pub use android_strings::write_android_strings;
pub use apple_strings::write_apple_strings;
pub use config::{config_file_path, ensure_config_exists, load_config};
pub use credential_store::CredentialStore;
pub use drive_client::DriveClient;
pub use oauth::{ClientSecret, OAuthClient};
pub use staging::StagingArea;
pub use translation_sheet::TranslationSheet;
