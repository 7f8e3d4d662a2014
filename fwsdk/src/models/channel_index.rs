//! Release channel index models
//!
//! Mirrors the `directory.json` document served by the update server:
//! a list of channels, each with versions sorted newest-first, each version
//! listing its published files.

use serde::{Deserialize, Serialize};

/// Root of the channel index document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelIndex {
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

/// A release track.
///
/// Versions stay untyped until one is selected, so entries that are never
/// looked at cannot fail the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    #[serde(default)]
    pub id: Option<String>,

    /// Published versions, newest first
    #[serde(default)]
    pub versions: Vec<serde_json::Value>,
}

impl ChannelEntry {
    /// Newest version of the channel, `None` when it lists no versions
    pub fn latest(&self) -> Option<Result<VersionEntry, serde_json::Error>> {
        self.versions
            .first()
            .map(|value| VersionEntry::deserialize(value))
    }
}

/// A published version within a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,

    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// A single downloadable artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Artifact kind, e.g. `sdk_zip`
    #[serde(rename = "type")]
    pub file_type: String,

    /// Hardware target, e.g. `f7`
    pub target: String,

    #[serde(default)]
    pub url: String,
}
