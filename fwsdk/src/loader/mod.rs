//! SDK loaders
//!
//! A loader turns a mode plus its parameters into a locally available SDK
//! archive and a version string. Four strategies exist:
//!
//! - [`branch`]: scrapes the HTML listing of a branch build directory
//! - [`channel`]: reads the JSON release-channel index
//! - [`url`]: downloads one fixed URL
//! - [`local`]: uses a file already on disk
//!
//! Loaders describe themselves as flat [`Metadata`], which is what gets
//! persisted after a deployment and what [`LoaderMode::reconstruct_args`]
//! turns back into constructor arguments.

pub mod branch;
pub mod channel;
pub mod factory;
pub mod index;
pub mod local;
pub mod url;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::errors::{Result, SdkError};
use crate::filesys::dir::Dir;
use crate::http::client::HttpClient;
use crate::models::request::{DeployRequest, ModeSelector};

pub use self::branch::{BranchArgs, BranchLoader};
pub use self::channel::{ChannelArgs, ChannelLoader, UpdateChannel};
pub use self::factory::LoaderFactory;
pub use self::local::{LocalArgs, LocalLoader};
pub use self::url::{UrlArgs, UrlLoader};

/// Flat string map describing a loader, or a task's parameters
pub type Metadata = BTreeMap<String, String>;

pub const MODE_KEY: &str = "mode";
pub const VERSION_KEY: &str = "version";
pub const HW_TARGET_KEY: &str = "hw_target";

/// Version reported by loaders that cannot determine one
pub const VERSION_UNKNOWN: &str = "unknown";

/// Persisted versions that never count as up to date
pub const ALWAYS_UPDATE_VERSIONS: [&str; 2] = [VERSION_UNKNOWN, "local"];

/// Loader strategy discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderMode {
    Branch,
    Channel,
    Url,
    Local,
}

impl LoaderMode {
    /// Registered modes. The order is also the tie-break order when a
    /// request is checked for its mode.
    pub const REGISTRY: [LoaderMode; 4] = [
        LoaderMode::Branch,
        LoaderMode::Channel,
        LoaderMode::Url,
        LoaderMode::Local,
    ];

    /// Key stored under `mode` in metadata
    pub fn key(&self) -> &'static str {
        match self {
            LoaderMode::Branch => "branch",
            LoaderMode::Channel => "channel",
            LoaderMode::Url => "url",
            LoaderMode::Local => "local",
        }
    }

    pub fn from_key(key: &str) -> Option<LoaderMode> {
        LoaderMode::REGISTRY.into_iter().find(|mode| mode.key() == key)
    }

    /// Rebuild constructor arguments from metadata
    pub fn reconstruct_args(&self, metadata: &Metadata) -> Result<LoaderArgs> {
        Ok(match self {
            LoaderMode::Branch => LoaderArgs::Branch(BranchArgs::from_metadata(metadata)?),
            LoaderMode::Channel => LoaderArgs::Channel(ChannelArgs::from_metadata(metadata)?),
            LoaderMode::Url => LoaderArgs::Url(UrlArgs::from_metadata(metadata)?),
            LoaderMode::Local => LoaderArgs::Local(LocalArgs::from_metadata(metadata)?),
        })
    }

    /// This mode's parameters as found in `request`
    pub fn request_metadata(&self, request: &DeployRequest) -> Result<Metadata> {
        match self {
            LoaderMode::Branch => Ok(BranchArgs::request_metadata(request)),
            LoaderMode::Channel => Ok(ChannelArgs::request_metadata(request)),
            LoaderMode::Url => UrlArgs::request_metadata(request),
            LoaderMode::Local => LocalArgs::request_metadata(request),
        }
    }

    /// Whether `request` selects this mode
    pub fn is_selected_by(&self, request: &DeployRequest) -> bool {
        matches!(
            (self, &request.mode),
            (LoaderMode::Branch, Some(ModeSelector::Branch(_)))
                | (LoaderMode::Channel, Some(ModeSelector::Channel(_)))
                | (LoaderMode::Url, Some(ModeSelector::Url(_)))
                | (LoaderMode::Local, Some(ModeSelector::Local(_)))
        )
    }
}

impl fmt::Display for LoaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Constructor arguments for one loader variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderArgs {
    Branch(BranchArgs),
    Channel(ChannelArgs),
    Url(UrlArgs),
    Local(LocalArgs),
}

impl LoaderArgs {
    pub fn mode(&self) -> LoaderMode {
        match self {
            LoaderArgs::Branch(_) => LoaderMode::Branch,
            LoaderArgs::Channel(_) => LoaderMode::Channel,
            LoaderArgs::Url(_) => LoaderMode::Url,
            LoaderArgs::Local(_) => LoaderMode::Local,
        }
    }
}

/// A constructed loader
#[derive(Debug)]
pub enum SdkLoader {
    Branch(BranchLoader),
    Channel(ChannelLoader),
    Url(UrlLoader),
    Local(LocalLoader),
}

impl SdkLoader {
    /// Construct a loader. Branch and channel loaders fetch their index here.
    pub async fn open(args: LoaderArgs, download_dir: Dir, client: &HttpClient) -> Result<Self> {
        Ok(match args {
            LoaderArgs::Branch(args) => {
                SdkLoader::Branch(BranchLoader::open(args, download_dir, client.clone()).await?)
            }
            LoaderArgs::Channel(args) => {
                SdkLoader::Channel(ChannelLoader::open(args, download_dir, client.clone()).await?)
            }
            LoaderArgs::Url(args) => SdkLoader::Url(UrlLoader::new(args, download_dir, client.clone())),
            LoaderArgs::Local(args) => SdkLoader::Local(LocalLoader::new(args)),
        })
    }

    pub fn mode(&self) -> LoaderMode {
        match self {
            SdkLoader::Branch(_) => LoaderMode::Branch,
            SdkLoader::Channel(_) => LoaderMode::Channel,
            SdkLoader::Url(_) => LoaderMode::Url,
            SdkLoader::Local(_) => LoaderMode::Local,
        }
    }

    /// Resolved version
    pub fn version(&self) -> &str {
        match self {
            SdkLoader::Branch(loader) => loader.version(),
            SdkLoader::Channel(loader) => loader.version(),
            SdkLoader::Url(_) | SdkLoader::Local(_) => VERSION_UNKNOWN,
        }
    }

    /// Local path of the SDK archive for `hw_target`, downloading it if needed
    pub async fn resolve(&self, hw_target: Option<&str>) -> Result<PathBuf> {
        match self {
            SdkLoader::Branch(loader) => loader.resolve(require_hw_target(hw_target)?).await,
            SdkLoader::Channel(loader) => loader.resolve(require_hw_target(hw_target)?).await,
            SdkLoader::Url(loader) => loader.resolve().await,
            SdkLoader::Local(loader) => Ok(loader.resolve()),
        }
    }

    /// Metadata to persist for this loader
    pub fn describe(&self) -> Metadata {
        match self {
            SdkLoader::Branch(loader) => loader.describe(),
            SdkLoader::Channel(loader) => loader.describe(),
            SdkLoader::Url(loader) => loader.describe(),
            SdkLoader::Local(loader) => loader.describe(),
        }
    }
}

fn require_hw_target(hw_target: Option<&str>) -> Result<&str> {
    hw_target
        .filter(|target| !target.is_empty())
        .ok_or_else(|| SdkError::MissingRequiredParameter(HW_TARGET_KEY.to_string()))
}

/// Non-empty value of `key` in `metadata`
pub(crate) fn param<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Like [`param`], but missing values are an error
pub(crate) fn required_param<'a>(metadata: &'a Metadata, key: &str) -> Result<&'a str> {
    param(metadata, key).ok_or_else(|| SdkError::MissingRequiredParameter(key.to_string()))
}

/// Build a metadata map, dropping unset values
pub(crate) fn metadata_of<'a>(
    entries: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> Metadata {
    entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect()
}
