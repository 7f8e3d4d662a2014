//! Error types for SDK resolution and deployment

use thiserror::Error;

use crate::models::file_kind::FileKind;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SdkError>;

/// Main error type for SDK resolution and deployment
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("{kind} not found for target {hw_target}")]
    ArtifactNotFound { kind: FileKind, hw_target: String },

    #[error("Found multiple versions: {recorded} and {found}")]
    VersionConflict { recorded: String, found: String },

    #[error("Malformed index {source_url}: {reason}")]
    MalformedIndex { source_url: String, reason: String },

    #[error("Channel not found in index: {0}")]
    ChannelNotFound(String),

    #[error("Channel has no versions: {0}")]
    EmptyVersionList(String),

    #[error("Version {0} has an empty file list")]
    EmptyFileList(String),

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidParameter { key: String, value: String },

    #[error("Failed to fetch {url}: {reason}")]
    TransferFailure { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SdkError {
    pub(crate) fn transfer(url: &str, reason: impl ToString) -> Self {
        SdkError::TransferFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(source_url: &str, reason: impl ToString) -> Self {
        SdkError::MalformedIndex {
            source_url: source_url.to_string(),
            reason: reason.to_string(),
        }
    }
}
