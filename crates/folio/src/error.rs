use std::path::PathBuf;
use thiserror::Error;

use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Content generation error: {0}")]
    Content(#[from] crate::content::ContentError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("Deployment error: {0}")]
    Deploy(#[from] crate::deploy::DeployError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Service error: {0}")]
    Service(#[from] crate::service::ServiceError),

    #[error("Failed to read request file '{path}': {source}")]
    ReadRequest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse request JSON: {0}")]
    ParseRequest(#[source] serde_json::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("Secret for {label} could not be resolved: {source}")]
    Secret {
        label: String,
        #[source]
        source: SecretError,
    },

    #[error("Could not determine a default config directory")]
    NoConfigDirectory,
}

pub type Result<T> = std::result::Result<T, FolioError>;
