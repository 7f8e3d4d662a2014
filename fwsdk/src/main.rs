//! fwsdk - Entry Point
//!
//! Manages the firmware SDK deployed in a local state directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;

use fwsdk::commands::{clean, status, update};
use fwsdk::deploy::SdkDeployer;
use fwsdk::logs::{init_logging, LogLevel, LogOptions};
use fwsdk::storage::layout::{StateLayout, HOME_ENV_VAR};
use fwsdk::storage::settings::Settings;
use fwsdk::utils::version_info;

#[derive(Debug, Parser)]
#[command(name = "fwsdk", about = "Firmware SDK resolver and deployer")]
struct Cli {
    /// State directory
    #[arg(short = 'd', long, global = true, env = HOME_ENV_VAR)]
    home: Option<PathBuf>,

    /// Disable SSL certificate verification
    #[arg(long, global = true)]
    no_check_certificate: bool,

    /// Force operation
    #[arg(short, long, global = true)]
    force: bool,

    /// Enable extra logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Log in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print version information and exit
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Update the SDK
    Update(update::UpdateArgs),
    /// Clean SDK state
    Clean(clean::CleanArgs),
    /// Show SDK status
    Status(status::StatusArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("fwsdk {}", version_info().long_version());
        return ExitCode::SUCCESS;
    }

    let verbose = cli.verbose;
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("Failed to run operation: {}. See --verbose for details", e);
            if verbose {
                eprintln!("{:?}", e);
            }
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let layout = match &cli.home {
        Some(home) => StateLayout::from_env(home),
        None => StateLayout::default(),
    };

    let settings = Settings::load(&layout.settings_file())
        .await
        .with_context(|| format!("Unable to read {}", layout.settings_file().path().display()));

    let log_level = match (&settings, cli.verbose) {
        (_, true) => LogLevel::Debug,
        (Ok(settings), false) => settings.log_level,
        (Err(_), false) => LogLevel::default(),
    };
    if let Err(e) = init_logging(LogOptions {
        log_level,
        json_format: cli.json_logs,
    }) {
        eprintln!("Failed to initialize logging: {e}");
    }
    let settings = settings?;

    let Some(command) = cli.command else {
        error!("No command given, see --help");
        return Ok(false);
    };

    let mut transport = settings.transport.to_options();
    if cli.no_check_certificate {
        transport.verify_certificates = false;
    }
    let deployer = SdkDeployer::new(layout, &transport)?;

    match command {
        Command::Update(args) => update::run(&deployer, args, cli.force).await,
        Command::Clean(args) => clean::run(&deployer, args).await,
        Command::Status(args) => status::run(&deployer, args).await,
    }
}
