//! Persisted deployment state
//!
//! The state file is the only durable record of what is deployed. It holds
//! the metadata of the loader that produced the current SDK plus the hardware
//! target, as a flat string map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::filesys::file::File;
use crate::loader::{Metadata, HW_TARGET_KEY, MODE_KEY, VERSION_KEY};

/// Last successfully deployed loader metadata merged with the hardware target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState(Metadata);

impl PersistedState {
    /// Build state from a loader description and the deployed target
    pub fn new(hw_target: Option<&str>, metadata: Metadata) -> Self {
        let mut values = BTreeMap::new();
        if let Some(hw_target) = hw_target {
            values.insert(HW_TARGET_KEY.to_string(), hw_target.to_string());
        }
        values.extend(metadata);
        Self(values)
    }

    pub fn from_map(values: Metadata) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.get(VERSION_KEY)
    }

    pub fn hw_target(&self) -> Option<&str> {
        self.get(HW_TARGET_KEY)
    }

    pub fn mode(&self) -> Option<&str> {
        self.get(MODE_KEY)
    }

    pub fn as_map(&self) -> &Metadata {
        &self.0
    }

    pub fn into_map(self) -> Metadata {
        self.0
    }

    /// Load state from `file`; `None` when it was never written
    pub async fn load(file: &File) -> Result<Option<Self>> {
        if !file.exists().await {
            return Ok(None);
        }
        Ok(Some(file.read_json().await?))
    }

    /// Write state to `file`, replacing any previous content
    pub async fn save(&self, file: &File) -> Result<()> {
        file.write_json(self).await
    }
}
