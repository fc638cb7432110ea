use crate::error::{FetchError, Result};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create `path` as a brand new directory. An existing entry is a conflict,
/// never reused.
pub fn create_dir_exclusive(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| FetchError::disk(parent, e))?;
        }
    }

    std::fs::create_dir(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => FetchError::SetupConflict {
            path: path.to_path_buf(),
        },
        _ => FetchError::disk(path, e),
    })
}

pub fn remove_dir_recursive(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Copy `from` into a new temporary file inside `dir`.
///
/// The copy only becomes visible under its final name once the caller
/// persists it; dropping the returned file deletes it.
pub fn copy_to_temp(from: &Path, dir: &Path) -> Result<(NamedTempFile, u64)> {
    let mut source = File::open(from).map_err(|e| FetchError::disk(from, e))?;
    let permissions = source
        .metadata()
        .map_err(|e| FetchError::disk(from, e))?
        .permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| FetchError::disk(dir, e))?;
    let bytes = std::io::copy(&mut source, temp.as_file_mut())
        .map_err(|e| FetchError::disk(temp.path(), e))?;
    temp.as_file_mut()
        .sync_all()
        .map_err(|e| FetchError::disk(temp.path(), e))?;
    std::fs::set_permissions(temp.path(), permissions)
        .map_err(|e| FetchError::disk(temp.path(), e))?;

    Ok((temp, bytes))
}

/// Calculate total size of a directory
pub fn calculate_dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0;

    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;

        if metadata.is_file() {
            total += metadata.len();
        } else if metadata.is_dir() {
            total += calculate_dir_size(&entry.path())?;
        }
    }

    Ok(total)
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Whether writing into a read-only `dir` is refused. Privileged users
/// bypass directory permissions, so failure tests check this first.
#[cfg(test)]
pub(crate) fn permissions_enforced(dir: &Path) -> bool {
    let marker = dir.join(".write-check");
    match std::fs::write(&marker, b"") {
        Ok(()) => {
            let _ = std::fs::remove_file(&marker);
            false
        }
        Err(_) => true,
    }
}
