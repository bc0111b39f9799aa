//! Domain layer - core types shared by every stage of the pipeline.
//!
//! This layer contains pure domain models, configuration and error types
//! without any I/O.

pub mod config;
pub mod error;
pub mod models;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use models::{
    ConversionReport, Credential, Listing, PipelineState, Platform, RemoteFileRef, TabSelector,
};
