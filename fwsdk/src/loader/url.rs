//! Direct URL loader. There is no index, so the version is never known.

use std::path::PathBuf;

use tracing::info;

use crate::errors::{Result, SdkError};
use crate::filesys::dir::Dir;
use crate::http::client::HttpClient;
use crate::loader::{required_param, LoaderMode, Metadata, MODE_KEY, VERSION_KEY, VERSION_UNKNOWN};
use crate::models::request::{DeployRequest, ModeSelector};

pub const URL_KEY: &str = "url";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlArgs {
    pub url: String,
}

impl UrlArgs {
    pub fn from_metadata(metadata: &Metadata) -> Result<Self> {
        Ok(Self {
            url: required_param(metadata, URL_KEY)?.to_string(),
        })
    }

    /// The target can't be inferred from a bare URL, so it must be given
    pub fn request_metadata(request: &DeployRequest) -> Result<Metadata> {
        let mut metadata = Metadata::new();
        if let Some(ModeSelector::Url(url)) = &request.mode {
            if request.hw_target.as_deref().unwrap_or_default().is_empty() {
                return Err(SdkError::MissingRequiredParameter(
                    "hw_target (required with a direct SDK URL)".to_string(),
                ));
            }
            metadata.insert(URL_KEY.to_string(), url.clone());
        }
        Ok(metadata)
    }
}

#[derive(Debug)]
pub struct UrlLoader {
    args: UrlArgs,
    download_dir: Dir,
    client: HttpClient,
}

impl UrlLoader {
    pub fn new(args: UrlArgs, download_dir: Dir, client: HttpClient) -> Self {
        Self {
            args,
            download_dir,
            client,
        }
    }

    pub async fn resolve(&self) -> Result<PathBuf> {
        info!("Fetching SDK from {}", self.args.url);
        self.client.fetch_file(&self.args.url, &self.download_dir).await
    }

    pub fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(MODE_KEY.to_string(), LoaderMode::Url.key().to_string());
        metadata.insert(URL_KEY.to_string(), self.args.url.clone());
        metadata.insert(VERSION_KEY.to_string(), VERSION_UNKNOWN.to_string());
        metadata
    }
}
