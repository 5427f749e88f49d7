use crate::utils::error::{PackagerError, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Remove a directory tree, first clearing read-only bits that would
/// otherwise block deletion (jlink marks image files read-only on Windows).
///
/// Returns `false` when there was nothing to remove.
pub fn remove_dir_force(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(PackagerError::fs("reading", path, e)),
    };

    if !metadata.is_dir() {
        if !metadata.file_type().is_symlink() {
            make_writable(path)?;
        }
        fs::remove_file(path).map_err(|e| PackagerError::fs("removing", path, e))?;
        return Ok(true);
    }

    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            PackagerError::fs("walking", at, std::io::Error::from(e))
        })?;
        if entry.path_is_symlink() {
            continue;
        }
        make_writable(entry.path())?;
    }

    fs::remove_dir_all(path).map_err(|e| PackagerError::fs("removing", path, e))?;
    tracing::debug!("Removed {}", path.display());
    Ok(true)
}

#[cfg(unix)]
fn make_writable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| PackagerError::fs("reading permissions for", path, e))?
        .permissions();
    let mode = perms.mode();
    if mode & 0o200 == 0 {
        perms.set_mode(mode | 0o200);
        fs::set_permissions(path, perms)
            .map_err(|e| PackagerError::fs("setting permissions on", path, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .map_err(|e| PackagerError::fs("reading permissions for", path, e))?
        .permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(path, perms)
            .map_err(|e| PackagerError::fs("setting permissions on", path, e))?;
    }
    Ok(())
}
