//! SDK deployer
//!
//! Decides whether the SDK in `current/` must be replaced, fetches and
//! extracts the new one, and records what was deployed.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::deploy::extract::extract_zip;
use crate::deploy::lock::StateLock;
use crate::deploy::status::{StatusSnapshot, NOT_DEPLOYED};
use crate::deploy::task::DeployTask;
use crate::errors::Result;
use crate::filesys::dir::Dir;
use crate::http::client::{HttpClient, TransportOptions};
use crate::loader::{
    LoaderFactory, SdkLoader, ALWAYS_UPDATE_VERSIONS, VERSION_KEY, VERSION_UNKNOWN,
};
use crate::storage::layout::{StateLayout, STATE_FILE_NAME};
use crate::storage::state::PersistedState;
use crate::utils::version_info;

/// Result of a deployment that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The deployed SDK already matched the task; nothing was touched
    UpToDate,
    /// A new SDK was extracted into `current/`
    Deployed,
}

/// What [`SdkDeployer::clean`] removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanScope {
    /// The deployed SDK and its state
    Current,
    /// Downloaded artifacts
    Downloads,
    /// The whole state directory
    Purge,
}

/// Deploys SDKs into one state directory
#[derive(Debug, Clone)]
pub struct SdkDeployer {
    layout: StateLayout,
    client: HttpClient,
}

impl SdkDeployer {
    pub fn new(layout: StateLayout, transport: &TransportOptions) -> Result<Self> {
        Ok(Self {
            layout,
            client: HttpClient::new(transport)?,
        })
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// Task that produced the deployed SDK, `None` when nothing is deployed
    pub async fn get_previous_task(&self) -> Option<DeployTask> {
        match PersistedState::load(&self.layout.state_file()).await {
            Ok(state) => {
                debug!("Loaded previous state: {:?}", state);
                state.map(DeployTask::from_persisted_state)
            }
            Err(e) => {
                warn!("Ignoring unreadable SDK state: {}", e);
                None
            }
        }
    }

    /// Deploy `task`, reporting failures through the log
    pub async fn deploy(&self, task: &DeployTask) -> bool {
        match self.try_deploy(task).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    "Failed to deploy SDK for {}: {}",
                    task.hw_target.as_deref().unwrap_or_default(),
                    e
                );
                false
            }
        }
    }

    /// Deploy `task`
    pub async fn try_deploy(&self, task: &DeployTask) -> Result<DeployOutcome> {
        let _lock = StateLock::acquire(&self.layout.lock_file()).await?;

        info!(
            "Deploying SDK for {}",
            task.hw_target.as_deref().unwrap_or_default()
        );
        let loader =
            LoaderFactory::create_for_task(task, self.layout.download_dir(), &self.client).await?;

        let sdk_dir = self.layout.current_sdk_dir();
        info!("SDK dir: {}", sdk_dir.absolute().display());

        if !task.force && sdk_dir.exists().await && self.is_up_to_date(task, &loader).await {
            info!("SDK is up-to-date");
            return Ok(DeployOutcome::UpToDate);
        }

        let archive = loader.resolve(task.hw_target.as_deref()).await?;

        info!("Deploying SDK");
        let state = PersistedState::new(task.hw_target.as_deref(), loader.describe());
        self.replace_current(&archive, &state).await?;

        info!("SDK deployed.");
        Ok(DeployOutcome::Deployed)
    }

    async fn is_up_to_date(&self, task: &DeployTask, loader: &SdkLoader) -> bool {
        let state = match PersistedState::load(&self.layout.state_file()).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("No SDK state found, updating");
                return false;
            }
            Err(e) => {
                warn!("Unreadable SDK state, updating: {}", e);
                return false;
            }
        };

        let deployed = state.version().unwrap_or_default();
        if ALWAYS_UPDATE_VERSIONS.contains(&deployed) {
            info!("Cannot determine current SDK version, updating");
            return false;
        }

        debug!(
            "Deployed version {} for {:?}, resolved {} for {:?}",
            deployed,
            state.hw_target(),
            loader.version(),
            task.hw_target
        );
        deployed == loader.version() && state.hw_target() == task.hw_target.as_deref()
    }

    /// Extract `archive` next to `current/`, then swap it in
    async fn replace_current(&self, archive: &Path, state: &PersistedState) -> Result<()> {
        let staging = self.layout.staging_sdk_dir();
        staging.delete().await?;

        if let Err(e) = self.stage(archive, state, &staging).await {
            let _ = staging.delete().await;
            return Err(e);
        }

        let current = self.layout.current_sdk_dir();
        current.delete().await?;
        staging.rename_to(&current).await
    }

    async fn stage(
        &self,
        archive: &Path,
        state: &PersistedState,
        staging: &Dir,
    ) -> Result<()> {
        let count = extract_zip(archive, staging).await?;
        debug!("Extracted {} files", count);

        let state_file = staging.file(STATE_FILE_NAME);
        state.save(&state_file).await
    }

    /// Paths of the state directory and the deployed SDK, if any
    pub async fn status(&self) -> StatusSnapshot {
        let mut snapshot = StatusSnapshot {
            fwsdk_version: version_info().version,
            state_dir: display_path(&self.layout.state_dir()),
            download_dir: display_path(&self.layout.download_dir()),
            toolchain_dir: display_path(&self.layout.toolchain_dir()),
            sdk_dir: display_path(&self.layout.current_sdk_dir()),
            target: None,
            mode: None,
            version: None,
            details: None,
            error: None,
        };

        match self.get_previous_task().await {
            Some(task) => {
                snapshot.version = Some(
                    task.params
                        .get(VERSION_KEY)
                        .cloned()
                        .unwrap_or_else(|| VERSION_UNKNOWN.to_string()),
                );
                snapshot.target = task.hw_target;
                snapshot.mode = task.mode;
                snapshot.details = Some(task.params);
            }
            None => snapshot.error = Some(NOT_DEPLOYED.to_string()),
        }
        snapshot
    }

    /// Remove part of the state directory. Missing paths are not an error.
    ///
    /// Waits for any deployment in progress to finish first.
    pub async fn clean(&self, scope: CleanScope) -> Result<()> {
        let _lock = StateLock::acquire(&self.layout.lock_file()).await?;

        let target = match scope {
            CleanScope::Current => self.layout.current_sdk_dir(),
            CleanScope::Downloads => self.layout.download_dir(),
            CleanScope::Purge => self.layout.state_dir(),
        };

        info!("Cleaning {}", target.path().display());
        target.delete().await?;
        if scope == CleanScope::Current {
            self.layout.staging_sdk_dir().delete().await?;
        }
        info!("Done");
        Ok(())
    }
}

fn display_path(dir: &Dir) -> String {
    dir.absolute().display().to_string()
}
