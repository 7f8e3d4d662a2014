//! Deploy task
//!
//! A task is assembled per invocation from three layers: the built-in
//! default, the task replayed from persisted state, and the explicit
//! request. Later layers only override what they actually set.

use tracing::debug;

use crate::errors::Result;
use crate::loader::{LoaderMode, Metadata};
use crate::loader::channel::{UpdateChannel, CHANNEL_KEY};
use crate::models::request::DeployRequest;
use crate::storage::state::PersistedState;

/// Hardware target used when nothing else names one
pub const DEFAULT_HW_TARGET: &str = "f7";

/// What to deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTask {
    pub hw_target: Option<String>,
    pub force: bool,
    /// Key of the loader that owns `params`
    pub mode: Option<String>,
    pub params: Metadata,
}

impl Default for DeployTask {
    /// Latest release for the default target
    fn default() -> Self {
        let mut params = Metadata::new();
        params.insert(
            CHANNEL_KEY.to_string(),
            UpdateChannel::Release.key().to_string(),
        );
        Self {
            hw_target: Some(DEFAULT_HW_TARGET.to_string()),
            force: false,
            mode: Some(LoaderMode::Channel.key().to_string()),
            params,
        }
    }
}

impl DeployTask {
    /// A task with nothing set
    pub fn empty() -> Self {
        Self {
            hw_target: None,
            force: false,
            mode: None,
            params: Metadata::new(),
        }
    }

    /// Overlay `update` onto this task.
    ///
    /// Empty values in `update` never erase existing ones, except `force`,
    /// which is always taken from `update`.
    pub fn merge(&mut self, update: DeployTask) {
        debug!("Deploy task update from {:?}", update);

        if let Some(hw_target) = update.hw_target.filter(|t| !t.is_empty()) {
            self.hw_target = Some(hw_target);
        }
        if let Some(mode) = update.mode.filter(|m| !m.is_empty()) {
            self.mode = Some(mode);
        }
        self.force = update.force;

        for (key, value) in update.params {
            if !value.is_empty() {
                self.params.insert(key, value);
            }
        }

        debug!("Deploy task updated: {:?}", self);
    }

    /// Build a task from an explicit request.
    ///
    /// Loader modes are checked in registry order; each contributes its
    /// parameters, and the first one the request selects becomes the mode.
    pub fn from_request(request: &DeployRequest) -> Result<Self> {
        let mut task = DeployTask {
            hw_target: request.hw_target.clone(),
            force: request.force,
            ..DeployTask::empty()
        };

        for mode in LoaderMode::REGISTRY {
            task.params.extend(mode.request_metadata(request)?);
            if mode.is_selected_by(request) {
                task.mode = Some(mode.key().to_string());
                break;
            }
        }

        debug!("Deploy task from request: {:?}", task);
        Ok(task)
    }

    /// Replay a persisted deployment. Never forced.
    pub fn from_persisted_state(state: PersistedState) -> Self {
        let hw_target = state.hw_target().map(str::to_string);
        let mode = state.mode().map(str::to_string);
        Self {
            hw_target,
            force: false,
            mode,
            params: state.into_map(),
        }
    }
}
