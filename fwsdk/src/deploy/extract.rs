//! SDK archive extraction

use std::io::{Cursor, Read};
use std::path::Path;

use tracing::debug;

use crate::errors::Result;
use crate::filesys::dir::Dir;

/// Extract every entry of the zip `archive` into `dest`.
///
/// Entries whose names escape `dest` are skipped. Unix permissions stored
/// in the archive are applied.
pub async fn extract_zip(archive: &Path, dest: &Dir) -> Result<usize> {
    let data = tokio::fs::read(archive).await?;
    dest.create().await?;
    debug!(
        "Extracting {} ({} bytes) into {}",
        archive.display(),
        data.len(),
        dest.path().display()
    );
    unpack(&data, dest.path())
}

fn unpack(data: &[u8], dest: &Path) -> Result<usize> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // declared sizes are untrusted
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        std::fs::write(&outpath, &content)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
        }
        written += 1;
    }

    Ok(written)
}
