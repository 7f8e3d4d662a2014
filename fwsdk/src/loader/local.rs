//! Local file loader. No network access and no version information.

use std::path::PathBuf;

use tracing::info;

use crate::errors::{Result, SdkError};
use crate::loader::{required_param, LoaderMode, Metadata, MODE_KEY, VERSION_KEY, VERSION_UNKNOWN};
use crate::models::request::{DeployRequest, ModeSelector};

pub const FILE_PATH_KEY: &str = "file_path";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArgs {
    pub file_path: PathBuf,
}

impl LocalArgs {
    pub fn from_metadata(metadata: &Metadata) -> Result<Self> {
        Ok(Self {
            file_path: PathBuf::from(required_param(metadata, FILE_PATH_KEY)?),
        })
    }

    /// Records the archive path as absolute, so later runs from another
    /// working directory still find it
    pub fn request_metadata(request: &DeployRequest) -> Result<Metadata> {
        let mut metadata = Metadata::new();
        if let Some(ModeSelector::Local(path)) = &request.mode {
            if request.hw_target.as_deref().unwrap_or_default().is_empty() {
                return Err(SdkError::MissingRequiredParameter(
                    "hw_target (required with a local SDK)".to_string(),
                ));
            }
            let path = std::path::absolute(path)?;
            metadata.insert(FILE_PATH_KEY.to_string(), path.to_string_lossy().into_owned());
        }
        Ok(metadata)
    }
}

#[derive(Debug)]
pub struct LocalLoader {
    args: LocalArgs,
}

impl LocalLoader {
    pub fn new(args: LocalArgs) -> Self {
        Self { args }
    }

    pub fn resolve(&self) -> PathBuf {
        info!("Loading SDK from {}", self.args.file_path.display());
        self.args.file_path.clone()
    }

    pub fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(MODE_KEY.to_string(), LoaderMode::Local.key().to_string());
        metadata.insert(
            FILE_PATH_KEY.to_string(),
            self.args.file_path.to_string_lossy().into_owned(),
        );
        metadata.insert(VERSION_KEY.to_string(), VERSION_UNKNOWN.to_string());
        metadata
    }
}
