//! Resolved version index shared by the branch and channel loaders

use std::collections::BTreeMap;

use crate::models::file_kind::FileKind;

/// Artifact URLs keyed by kind and hardware target, plus the snapshot's version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionIndex {
    files: BTreeMap<(FileKind, String), String>,
    version: Option<String>,
}

impl VersionIndex {
    pub fn new(version: Option<String>) -> Self {
        Self {
            files: BTreeMap::new(),
            version,
        }
    }

    pub fn insert(&mut self, kind: FileKind, hw_target: &str, url: String) {
        self.files.insert((kind, hw_target.to_string()), url);
    }

    pub fn get(&self, kind: FileKind, hw_target: &str) -> Option<&str> {
        self.files
            .get(&(kind, hw_target.to_string()))
            .map(String::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn set_version(&mut self, version: String) {
        self.version = Some(version);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All `(kind, target, url)` entries in a stable order
    pub fn entries(&self) -> impl Iterator<Item = (FileKind, &str, &str)> {
        self.files
            .iter()
            .map(|((kind, target), url)| (*kind, target.as_str(), url.as_str()))
    }
}
