//! Branch loader
//!
//! Resolves an SDK from a branch build directory on the update server by
//! scraping its HTML index page. Artifact names follow
//! `flipper-z-<target>-<kind>-<version>.<ext>`; every artifact in one branch
//! directory is expected to carry the same version.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::errors::{Result, SdkError};
use crate::filesys::dir::Dir;
use crate::http::client::HttpClient;
use crate::loader::index::VersionIndex;
use crate::loader::{
    metadata_of, param, required_param, LoaderMode, Metadata, MODE_KEY, VERSION_KEY,
    VERSION_UNKNOWN,
};
use crate::models::file_kind::FileKind;
use crate::models::request::{DeployRequest, ModeSelector};

/// Builds root on the official update server
pub const DEFAULT_BRANCH_ROOT: &str = "https://update.flipperzero.one/builds/firmware";

pub const BRANCH_KEY: &str = "branch";
pub const BRANCH_ROOT_KEY: &str = "branch_root";

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("anchor pattern is valid")
});

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^flipper-z-(\w+)-(\w+)-(.+)\.(\w+)$").expect("file name pattern is valid")
});

/// Branch loader constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchArgs {
    pub branch: String,
    pub branch_root: String,
}

impl BranchArgs {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            branch_root: DEFAULT_BRANCH_ROOT.to_string(),
        }
    }

    pub fn from_metadata(metadata: &Metadata) -> Result<Self> {
        Ok(Self {
            branch: required_param(metadata, BRANCH_KEY)?.to_string(),
            branch_root: param(metadata, BRANCH_ROOT_KEY)
                .unwrap_or(DEFAULT_BRANCH_ROOT)
                .to_string(),
        })
    }

    pub fn request_metadata(request: &DeployRequest) -> Metadata {
        let branch = match &request.mode {
            Some(ModeSelector::Branch(branch)) => Some(branch.clone()),
            _ => None,
        };
        metadata_of([
            (BRANCH_KEY, branch),
            (BRANCH_ROOT_KEY, request.index_url.clone()),
        ])
    }

    /// URL of the branch's index page
    pub fn branch_url(&self) -> String {
        format!("{}/{}/", self.branch_root.trim_end_matches('/'), self.branch)
    }
}

/// Loader backed by a branch directory listing
#[derive(Debug)]
pub struct BranchLoader {
    args: BranchArgs,
    index: VersionIndex,
    download_dir: Dir,
    client: HttpClient,
}

impl BranchLoader {
    /// Fetch and parse the branch index page
    pub async fn open(args: BranchArgs, download_dir: Dir, client: HttpClient) -> Result<Self> {
        let branch_url = args.branch_url();
        info!("Fetching branch index {}", branch_url);

        let html = client.get_text(&branch_url).await?;
        let index = parse_branch_listing(&html, &branch_url)?;
        info!(
            "Found version {}",
            index.version().unwrap_or(VERSION_UNKNOWN)
        );
        for (kind, target, url) in index.entries() {
            debug!("{} for {}: {}", kind, target, url);
        }

        Ok(Self {
            args,
            index,
            download_dir,
            client,
        })
    }

    pub fn index(&self) -> &VersionIndex {
        &self.index
    }

    pub fn version(&self) -> &str {
        self.index.version().unwrap_or(VERSION_UNKNOWN)
    }

    /// URL of the artifact of `kind` for `hw_target`
    pub fn artifact_url(&self, kind: FileKind, hw_target: &str) -> Result<&str> {
        self.index
            .get(kind, hw_target)
            .ok_or_else(|| SdkError::ArtifactNotFound {
                kind,
                hw_target: hw_target.to_string(),
            })
    }

    pub async fn resolve(&self, hw_target: &str) -> Result<PathBuf> {
        let url = self.artifact_url(FileKind::SdkZip, hw_target)?;
        self.client.fetch_file(url, &self.download_dir).await
    }

    pub fn describe(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(MODE_KEY.to_string(), LoaderMode::Branch.key().to_string());
        metadata.insert(BRANCH_KEY.to_string(), self.args.branch.clone());
        metadata.insert(VERSION_KEY.to_string(), self.version().to_string());
        metadata.insert(BRANCH_ROOT_KEY.to_string(), self.args.branch_root.clone());
        metadata
    }
}

/// Parse a branch directory listing.
///
/// Links to `.map` files are ignored. Kinds not in [`FileKind`] are skipped,
/// but their version still takes part in the consistency check.
pub fn parse_branch_listing(html: &str, branch_url: &str) -> Result<VersionIndex> {
    let mut index = VersionIndex::new(None);

    for anchor in ANCHOR_RE.captures_iter(html) {
        let Some(href) = anchor.get(1).or(anchor.get(2)).or(anchor.get(3)) else {
            continue;
        };
        let href = href.as_str().replace("&amp;", "&");
        if href.is_empty() || href.contains(".map") {
            continue;
        }

        let Some(file) = FILE_NAME_RE.captures(&href) else {
            continue;
        };
        let (target, kind, version, ext) = (&file[1], &file[2], &file[3], &file[4]);

        match FileKind::from_name(&format!("{}_{}", kind, ext)) {
            Some(kind) => index.insert(kind, target, format!("{}{}", branch_url, href)),
            None => debug!("Skipping unknown artifact kind in {}", href),
        }

        match index.version().map(str::to_string) {
            None => index.set_version(version.to_string()),
            Some(recorded) if !version.starts_with(&recorded) => {
                return Err(SdkError::VersionConflict {
                    recorded,
                    found: version.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(index)
}
