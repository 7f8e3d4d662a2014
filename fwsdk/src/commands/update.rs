//! Update command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::deploy::{DeployTask, SdkDeployer};
use crate::models::request::{DeployRequest, ModeSelector};

/// Arguments for the update command
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Hardware target
    #[arg(short = 't', long)]
    pub hw_target: Option<String>,

    /// URL to use for SDK discovery
    #[arg(long)]
    pub index_url: Option<String>,

    #[command(flatten)]
    pub mode: ModeArgs,
}

/// SDK source. At most one may be given.
#[derive(Debug, Default, Args)]
#[group(required = false, multiple = false)]
pub struct ModeArgs {
    /// Branch to load SDK from
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Channel to load SDK from
    #[arg(short, long, value_parser = ["dev", "rc", "release"])]
    pub channel: Option<String>,

    /// Direct URL to load SDK from
    #[arg(short, long)]
    pub url: Option<String>,

    /// Path to local SDK zip file
    #[arg(short, long)]
    pub local: Option<PathBuf>,
}

impl ModeArgs {
    pub fn selector(self) -> Option<ModeSelector> {
        if let Some(branch) = self.branch {
            Some(ModeSelector::Branch(branch))
        } else if let Some(channel) = self.channel {
            Some(ModeSelector::Channel(channel))
        } else if let Some(url) = self.url {
            Some(ModeSelector::Url(url))
        } else {
            self.local.map(ModeSelector::Local)
        }
    }
}

impl UpdateArgs {
    pub fn into_request(self, force: bool) -> DeployRequest {
        DeployRequest {
            hw_target: self.hw_target,
            force,
            index_url: self.index_url,
            mode: self.mode.selector(),
        }
    }
}

/// Run the update command. Uses the last deployed target and mode unless
/// the arguments say otherwise; deploys the latest release when nothing
/// was deployed before.
pub async fn run(deployer: &SdkDeployer, args: UpdateArgs, force: bool) -> Result<bool> {
    let request = args.into_request(force);
    debug!("Update request: {:?}", request);

    let mut task = deployer
        .get_previous_task()
        .await
        .unwrap_or_default();
    task.merge(DeployTask::from_request(&request)?);

    Ok(deployer.deploy(&task).await)
}
