//! Deployment request handed over by the command-line layer

use std::path::PathBuf;

/// Which loader the caller asked for, with that loader's parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSelector {
    /// Branch name on the update server
    Branch(String),

    /// Release channel name (`dev`, `rc`, `release`)
    Channel(String),

    /// Direct artifact URL
    Url(String),

    /// Path to an artifact on the local filesystem
    Local(PathBuf),
}

/// A structured deployment request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployRequest {
    /// Hardware target, if given explicitly
    pub hw_target: Option<String>,

    /// Redeploy even when the installed SDK looks current
    pub force: bool,

    /// Override for the branch root or channel index URL
    pub index_url: Option<String>,

    /// At most one requested mode
    pub mode: Option<ModeSelector>,
}
