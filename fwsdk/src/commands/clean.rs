//! Clean command implementation

use anyhow::Result;
use clap::Args;

use crate::deploy::{CleanScope, SdkDeployer};

/// Arguments for the clean command. Cleans the current SDK by default.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Clean downloads
    #[arg(long)]
    pub downloads: bool,

    /// Purge the whole state directory
    #[arg(long)]
    pub purge: bool,
}

impl CleanArgs {
    pub fn scope(&self) -> CleanScope {
        if self.purge {
            CleanScope::Purge
        } else if self.downloads {
            CleanScope::Downloads
        } else {
            CleanScope::Current
        }
    }
}

/// Run the clean command
pub async fn run(deployer: &SdkDeployer, args: CleanArgs) -> Result<bool> {
    deployer.clean(args.scope()).await?;
    Ok(true)
}
