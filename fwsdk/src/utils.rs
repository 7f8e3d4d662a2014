//! Utility functions

use serde::{Deserialize, Serialize};

/// Build information for this binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

impl VersionInfo {
    /// One-line form for `--version`
    pub fn long_version(&self) -> String {
        format!("{} ({}, built {})", self.version, self.git_hash, self.build_time)
    }
}
