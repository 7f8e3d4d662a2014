//! Loader selection for deploy tasks

use tracing::debug;

use crate::deploy::task::DeployTask;
use crate::errors::{Result, SdkError};
use crate::filesys::dir::Dir;
use crate::http::client::HttpClient;
use crate::loader::{LoaderArgs, LoaderMode, SdkLoader};

/// Builds the loader a task asks for
pub struct LoaderFactory;

impl LoaderFactory {
    /// Constructor arguments for `task`, without touching the network
    pub fn args_for_task(task: &DeployTask) -> Result<LoaderArgs> {
        let mode_key = task.mode.as_deref().unwrap_or_default();
        let mode = LoaderMode::from_key(mode_key)
            .ok_or_else(|| SdkError::InvalidMode(mode_key.to_string()))?;

        let args = mode.reconstruct_args(&task.params)?;
        debug!("Loader for task: {:?}", args);
        Ok(args)
    }

    /// Construct the loader for `task`
    pub async fn create_for_task(
        task: &DeployTask,
        download_dir: Dir,
        client: &HttpClient,
    ) -> Result<SdkLoader> {
        let args = Self::args_for_task(task)?;
        SdkLoader::open(args, download_dir, client).await
    }
}
