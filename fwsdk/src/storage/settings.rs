//! Settings file management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::filesys::file::File;
use crate::http::client::{TransportOptions, DEFAULT_USER_AGENT};
use crate::logs::LogLevel;

/// Tool settings, read from `settings.json` in the state directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Network transport configuration
    #[serde(default)]
    pub transport: TransportSettings,
}

impl Settings {
    /// Load settings from `file`, using defaults when it doesn't exist
    pub async fn load(file: &File) -> Result<Self> {
        if !file.exists().await {
            debug!("No settings file at {}, using defaults", file.path().display());
            return Ok(Self::default());
        }
        file.read_json().await
    }
}

/// Network transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify TLS certificates
    #[serde(default = "default_true")]
    pub verify_certificates: bool,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            verify_certificates: true,
            user_agent: default_user_agent(),
        }
    }
}

impl TransportSettings {
    pub fn to_options(&self) -> TransportOptions {
        TransportOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            verify_certificates: self.verify_certificates,
            user_agent: self.user_agent.clone(),
        }
    }
}
