//! Artifact kinds published by the update server

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a published firmware artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    SdkZip,
    LibZip,
    Core2FirmwareTgz,
    ResourcesTgz,
    ScriptsTgz,
    UpdateTgz,
    FirmwareElf,
    FullBin,
    FullDfu,
    FullJson,
    UpdaterBin,
    UpdaterDfu,
    UpdaterElf,
    UpdaterJson,
}

impl FileKind {
    pub const ALL: [FileKind; 14] = [
        FileKind::SdkZip,
        FileKind::LibZip,
        FileKind::Core2FirmwareTgz,
        FileKind::ResourcesTgz,
        FileKind::ScriptsTgz,
        FileKind::UpdateTgz,
        FileKind::FirmwareElf,
        FileKind::FullBin,
        FileKind::FullDfu,
        FileKind::FullJson,
        FileKind::UpdaterBin,
        FileKind::UpdaterDfu,
        FileKind::UpdaterElf,
        FileKind::UpdaterJson,
    ];

    /// Wire name, as used in the JSON index `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::SdkZip => "sdk_zip",
            FileKind::LibZip => "lib_zip",
            FileKind::Core2FirmwareTgz => "core2_firmware_tgz",
            FileKind::ResourcesTgz => "resources_tgz",
            FileKind::ScriptsTgz => "scripts_tgz",
            FileKind::UpdateTgz => "update_tgz",
            FileKind::FirmwareElf => "firmware_elf",
            FileKind::FullBin => "full_bin",
            FileKind::FullDfu => "full_dfu",
            FileKind::FullJson => "full_json",
            FileKind::UpdaterBin => "updater_bin",
            FileKind::UpdaterDfu => "updater_dfu",
            FileKind::UpdaterElf => "updater_elf",
            FileKind::UpdaterJson => "updater_json",
        }
    }

    /// Case-insensitive lookup; `None` for kinds we don't know about
    pub fn from_name(name: &str) -> Option<FileKind> {
        let name = name.to_ascii_lowercase();
        FileKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
