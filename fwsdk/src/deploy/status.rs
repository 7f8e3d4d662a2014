//! Deployment status snapshot

use serde::Serialize;
use serde_json::Value;

use crate::loader::Metadata;

pub const NOT_DEPLOYED: &str = "SDK is not deployed";

/// Status keys in display order, with their labels
pub const STATUS_FIELDS: [(&str, &str); 10] = [
    ("fwsdk_version", "fwsdk version"),
    ("state_dir", "State dir"),
    ("download_dir", "Download dir"),
    ("toolchain_dir", "Toolchain dir"),
    ("sdk_dir", "SDK dir"),
    ("target", "Target"),
    ("mode", "Mode"),
    ("version", "Version"),
    ("details", "Details"),
    ("error", "Error"),
];

/// Paths of a state directory plus what is deployed in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub fwsdk_version: String,
    pub state_dir: String,
    pub download_dir: String,
    pub toolchain_dir: String,
    pub sdk_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusSnapshot {
    /// Value of one status key, `None` when unknown or unset
    pub fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(self).ok()? {
            Value::Object(mut fields) => fields.remove(key),
            _ => None,
        }
    }

    /// Set keys in display order, with labels
    pub fn entries(&self) -> Vec<(&'static str, Value)> {
        STATUS_FIELDS
            .iter()
            .filter_map(|(key, label)| self.get(key).map(|value| (*label, value)))
            .collect()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Plain-text rendering of a status value
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
