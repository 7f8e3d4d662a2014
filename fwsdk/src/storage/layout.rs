//! State directory layout

use std::path::PathBuf;

use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Environment variable overriding the state directory
pub const HOME_ENV_VAR: &str = "FWSDK_HOME";

/// Environment variable overriding the toolchain root
pub const TOOLCHAIN_ENV_VAR: &str = "FWSDK_TOOLCHAIN_PATH";

/// Name of the toolchain subdirectory under the toolchain root
pub const TOOLCHAIN_SUBDIR: &str = "toolchain";

/// Name of the persisted deployment state file inside `current/`
pub const STATE_FILE_NAME: &str = "sdk_state.json";

/// Storage layout of a state directory
///
/// ```text
/// <state_dir>/
///   download/            fetched artifacts, never cleaned by deploy
///   current/             extracted SDK
///     sdk_state.json     persisted deployment state
///   toolchain/           owned by the toolchain installer
///   settings.json        optional settings
///   .lock                held while a deployment runs
/// ```
#[derive(Debug, Clone)]
pub struct StateLayout {
    /// Base directory for all storage
    pub state_dir: PathBuf,

    toolchain_root: PathBuf,
}

impl StateLayout {
    /// Create a layout rooted at `state_dir`, with the toolchain under the same root
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            toolchain_root: state_dir.clone(),
            state_dir,
        }
    }

    /// Create a layout rooted at `state_dir`, resolving the toolchain root from
    /// the environment
    pub fn from_env(state_dir: impl Into<PathBuf>) -> Self {
        let mut layout = Self::new(state_dir);
        if let Some(root) = std::env::var_os(TOOLCHAIN_ENV_VAR) {
            layout.toolchain_root = PathBuf::from(root);
        }
        layout
    }

    /// The state directory itself
    pub fn state_dir(&self) -> Dir {
        Dir::new(&self.state_dir)
    }

    /// Raw downloaded artifacts
    pub fn download_dir(&self) -> Dir {
        Dir::new(self.state_dir.join("download"))
    }

    /// Currently deployed SDK
    pub fn current_sdk_dir(&self) -> Dir {
        Dir::new(self.state_dir.join("current"))
    }

    /// Staging directory a new SDK is extracted into before it replaces `current/`
    pub fn staging_sdk_dir(&self) -> Dir {
        Dir::new(self.state_dir.join(".current.tmp"))
    }

    /// Toolchain directory. Only the path is computed here.
    pub fn toolchain_dir(&self) -> Dir {
        Dir::new(self.toolchain_root.join(TOOLCHAIN_SUBDIR))
    }

    /// Persisted deployment state
    pub fn state_file(&self) -> File {
        self.current_sdk_dir().file(STATE_FILE_NAME)
    }

    /// Optional settings file
    pub fn settings_file(&self) -> File {
        self.state_dir().file("settings.json")
    }

    /// Lock file guarding deployments
    pub fn lock_file(&self) -> File {
        self.state_dir().file(".lock")
    }
}

impl Default for StateLayout {
    fn default() -> Self {
        let base_dir = match std::env::var_os(HOME_ENV_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".fwsdk"),
        };

        Self::from_env(base_dir)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
