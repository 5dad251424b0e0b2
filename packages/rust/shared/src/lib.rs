//! Shared types, error model, and configuration for Transcoder.
//!
//! This crate is the foundation depended on by all other Transcoder crates.
//! It provides:
//! - [`TranscoderError`]: the unified error type
//! - The owned document model ([`Document`], [`Paragraph`], [`Run`])
//! - The coding taxonomy ([`Category`]) and classifier output ([`QuoteMatch`])
//! - Configuration ([`AppConfig`], [`ServiceConfig`], config loading)

pub mod config;
pub mod document;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AzureConfig, DEFAULT_MAX_CHUNK_CHARS, DefaultsConfig, ServiceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_service_config,
    resolve_service_config_with,
};
pub use document::{Document, Paragraph, Run, RunStyle};
pub use error::{Result, TranscoderError};
pub use types::{Category, QuoteMatch};
