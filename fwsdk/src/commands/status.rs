//! Status command implementation

use anyhow::Result;
use clap::Args;
use tracing::error;

use crate::deploy::status::{display_value, STATUS_FIELDS};
use crate::deploy::SdkDeployer;

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Print only a single value for a specific status key
    #[arg(value_parser = STATUS_FIELDS.map(|(key, _)| key))]
    pub key: Option<String>,

    /// Print status in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the status command. Status goes to stdout.
pub async fn run(deployer: &SdkDeployer, args: StatusArgs) -> Result<bool> {
    let status = deployer.status().await;

    match args.key.as_deref() {
        Some(key) => {
            let Some(value) = status.get(key) else {
                error!("Unknown status key {}", key);
                return Ok(false);
            };
            if args.json {
                println!("{}", serde_json::to_string(&value)?);
            } else {
                println!("{}", display_value(&value));
            }
        }
        None if args.json => println!("{}", serde_json::to_string(&status)?),
        None => {
            for (label, value) in status.entries() {
                println!("{:<15} {}", label, display_value(&value));
            }
            return Ok(!status.is_error());
        }
    }

    if let Some(e) = &status.error {
        error!("Status error: {}", e);
        return Ok(false);
    }
    Ok(true)
}
