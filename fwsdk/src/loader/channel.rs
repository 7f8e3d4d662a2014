//! Update channel loader
//!
//! Resolves an SDK from a release channel described by a JSON index. Works
//! with the official update server and any mirror serving the same format.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::{Result, SdkError};
use crate::filesys::dir::Dir;
use crate::http::client::HttpClient;
use crate::loader::index::VersionIndex;
use crate::loader::{
    metadata_of, param, required_param, LoaderMode, Metadata, MODE_KEY, VERSION_KEY,
};
use crate::models::channel_index::{ChannelIndex, FileEntry, VersionEntry};
use crate::models::file_kind::FileKind;
use crate::models::request::{DeployRequest, ModeSelector};

/// Channel index on the official update server
pub const DEFAULT_JSON_INDEX: &str = "https://update.flipperzero.one/firmware/directory.json";

pub const CHANNEL_KEY: &str = "channel";
pub const JSON_INDEX_KEY: &str = "json_index";

/// Release track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateChannel {
    Dev,
    Rc,
    Release,
}

impl UpdateChannel {
    pub const ALL: [UpdateChannel; 3] =
        [UpdateChannel::Dev, UpdateChannel::Rc, UpdateChannel::Release];

    /// Short name used on the command line and in persisted state
    pub fn key(&self) -> &'static str {
        match self {
            UpdateChannel::Dev => "dev",
            UpdateChannel::Rc => "rc",
            UpdateChannel::Release => "release",
        }
    }

    /// Channel `id` in the JSON index
    pub fn index_id(&self) -> &'static str {
        match self {
            UpdateChannel::Dev => "development",
            UpdateChannel::Rc => "release-candidate",
            UpdateChannel::Release => "release",
        }
    }
}

impl std::str::FromStr for UpdateChannel {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.to_ascii_lowercase();
        UpdateChannel::ALL
            .into_iter()
            .find(|channel| channel.key() == key)
            .ok_or_else(|| SdkError::InvalidParameter {
                key: CHANNEL_KEY.to_string(),
                value: s.to_string(),
            })
    }
}

impl fmt::Display for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Channel loader constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelArgs {
    pub channel: UpdateChannel,
    pub json_index: String,
}

impl ChannelArgs {
    pub fn new(channel: UpdateChannel) -> Self {
        Self {
            channel,
            json_index: DEFAULT_JSON_INDEX.to_string(),
        }
    }

    pub fn from_metadata(metadata: &Metadata) -> Result<Self> {
        Ok(Self {
            channel: required_param(metadata, CHANNEL_KEY)?.parse()?,
            json_index: param(metadata, JSON_INDEX_KEY)
                .unwrap_or(DEFAULT_JSON_INDEX)
                .to_string(),
        })
    }

    pub fn request_metadata(request: &DeployRequest) -> Metadata {
        let channel = match &request.mode {
            Some(ModeSelector::Channel(channel)) => Some(channel.clone()),
            _ => None,
        };
        metadata_of([
            (CHANNEL_KEY, channel),
            (JSON_INDEX_KEY, request.index_url.clone()),
        ])
    }
}

/// Loader backed by a JSON channel index
#[derive(Debug)]
pub struct ChannelLoader {
    args: ChannelArgs,
    version: VersionEntry,
    download_dir: Dir,
    client: HttpClient,
}

impl ChannelLoader {
    /// Fetch the channel index and select the newest version of the channel
    pub async fn open(args: ChannelArgs, download_dir: Dir, client: HttpClient) -> Result<Self> {
        info!(
            "Fetching version info for {} from {}",
            args.channel, args.json_index
        );

        let document = client.get_text(&args.json_index).await?;
        let version = parse_channel_index(&document, &args.json_index, args.channel)?;

        info!("Using version: {}", version.version);
        debug!(
            "Changelog: {}",
            version.changelog.as_deref().unwrap_or("None")
        );

        Ok(Self {
            args,
            version,
            download_dir,
            client,
        })
    }

    pub fn version(&self) -> &str {
        &self.version.version
    }

    pub fn changelog(&self) -> Option<&str> {
        self.version.changelog.as_deref()
    }

    /// Known artifacts of the selected version
    pub fn index(&self) -> VersionIndex {
        let mut index = VersionIndex::new(Some(self.version.version.clone()));
        for file in &self.version.files {
            if let Some(kind) = FileKind::from_name(&file.file_type) {
                index.insert(kind, &file.target, file.url.clone());
            }
        }
        index
    }

    /// URL of the artifact of `kind` for `hw_target`
    pub fn artifact_url(&self, kind: FileKind, hw_target: &str) -> Result<&str> {
        let file = find_file(&self.version, kind, hw_target)?;
        if file.url.is_empty() {
            return Err(SdkError::malformed(
                &self.args.json_index,
                format!("{} for {} has no url", kind, hw_target),
            ));
        }
        Ok(&file.url)
    }

    pub async fn resolve(&self, hw_target: &str) -> Result<PathBuf> {
        let url = self.artifact_url(FileKind::SdkZip, hw_target)?;
        self.client.fetch_file(url, &self.download_dir).await
    }

    pub fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(MODE_KEY.to_string(), LoaderMode::Channel.key().to_string());
        metadata.insert(CHANNEL_KEY.to_string(), self.args.channel.key().to_string());
        metadata.insert(JSON_INDEX_KEY.to_string(), self.args.json_index.clone());
        metadata.insert(VERSION_KEY.to_string(), self.version.version.clone());
        metadata
    }
}

/// Parse a channel index document and return the newest version of `channel`
pub fn parse_channel_index(
    document: &str,
    index_url: &str,
    channel: UpdateChannel,
) -> Result<VersionEntry> {
    let index: ChannelIndex =
        serde_json::from_str(document).map_err(|e| SdkError::malformed(index_url, e))?;

    let entry = index
        .channels
        .iter()
        .find(|c| c.id.as_deref() == Some(channel.index_id()))
        .ok_or_else(|| SdkError::ChannelNotFound(channel.index_id().to_string()))?;

    entry
        .latest()
        .ok_or_else(|| SdkError::EmptyVersionList(channel.index_id().to_string()))?
        .map_err(|e| SdkError::malformed(index_url, e))
}

/// Find the file of `kind` for `hw_target` in `version`
pub fn find_file<'a>(
    version: &'a VersionEntry,
    kind: FileKind,
    hw_target: &str,
) -> Result<&'a FileEntry> {
    if version.files.is_empty() {
        return Err(SdkError::EmptyFileList(version.version.clone()));
    }

    version
        .files
        .iter()
        .find(|f| f.file_type == kind.as_str() && f.target == hw_target)
        .ok_or_else(|| SdkError::ArtifactNotFound {
            kind,
            hw_target: hw_target.to_string(),
        })
}
