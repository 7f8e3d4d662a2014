//! SDK deployment

pub mod deployer;
pub mod extract;
pub mod lock;
pub mod status;
pub mod task;

pub use deployer::{CleanScope, DeployOutcome, SdkDeployer};
pub use status::StatusSnapshot;
pub use task::DeployTask;
