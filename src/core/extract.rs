use crate::error::{FetchError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn detect(archive_path: &Path) -> Result<Self> {
        let file_name = archive_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FetchError::corrupt(archive_path, "invalid archive file name"))?;
        let lower = file_name.to_ascii_lowercase();

        if lower.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Ok(ArchiveFormat::TarGz)
        } else {
            Err(FetchError::corrupt(
                archive_path,
                format!("unsupported archive format: {file_name}"),
            ))
        }
    }
}

/// Unpack every entry of `archive_path` beneath `destination`.
///
/// Entries whose paths would escape `destination` are skipped. A later entry
/// with the same path as an earlier one replaces it. Returns the number of
/// files written.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<usize> {
    if !archive_path.is_file() {
        return Err(FetchError::corrupt(archive_path, "archive file does not exist"));
    }

    let format = ArchiveFormat::detect(archive_path)?;
    tracing::info!(archive = %archive_path.display(), ?format, "extracting archive");

    let files = match format {
        ArchiveFormat::Zip => extract_zip(archive_path, destination)?,
        ArchiveFormat::TarGz => extract_tar_gz(archive_path, destination)?,
    };

    tracing::debug!(files, "extraction completed");
    Ok(files)
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| FetchError::disk(archive_path, e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| FetchError::corrupt(archive_path, e.to_string()))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| FetchError::corrupt(archive_path, e.to_string()))?;
        let outpath = match entry.enclosed_name() {
            Some(path) => destination.join(path),
            None => {
                tracing::debug!(entry = entry.name(), "skipping entry outside extraction root");
                continue;
            }
        };

        if entry.is_dir() {
            create_dir(&outpath)?;
        } else {
            write_entry(&mut entry, &outpath, archive_path)?;
            files += 1;
        }
    }
    Ok(files)
}

fn extract_tar_gz(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| FetchError::disk(archive_path, e))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let mut files = 0;
    let entries = archive
        .entries()
        .map_err(|e| FetchError::corrupt(archive_path, e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| FetchError::corrupt(archive_path, e.to_string()))?;
        let relative = entry
            .path()
            .map_err(|e| FetchError::corrupt(archive_path, e.to_string()))?
            .into_owned();
        let Some(relative) = enclosed(&relative) else {
            tracing::debug!(entry = %relative.display(), "skipping entry outside extraction root");
            continue;
        };
        let outpath = destination.join(relative);

        let kind = entry.header().entry_type();
        if kind.is_dir() {
            create_dir(&outpath)?;
        } else if kind.is_file() {
            write_entry(&mut entry, &outpath, archive_path)?;
            files += 1;
        } else {
            tracing::debug!(entry = %outpath.display(), "skipping non-regular entry");
        }
    }
    Ok(files)
}

/// Relative path with no root, prefix or parent components.
fn enclosed(path: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| FetchError::disk(path, e))
}

/// Read failures mean the archive is damaged, write failures are the disk's.
fn write_entry<R: Read>(reader: &mut R, outpath: &Path, archive_path: &Path) -> Result<()> {
    if let Some(parent) = outpath.parent() {
        create_dir(parent)?;
    }
    let mut outfile = File::create(outpath).map_err(|e| FetchError::disk(outpath, e))?;

    let mut buffer = [0u8; 16 * 1024];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FetchError::corrupt(
                    archive_path,
                    format!("failed reading {}: {e}", outpath.display()),
                ))
            }
        };
        outfile
            .write_all(&buffer[..read])
            .map_err(|e| FetchError::disk(outpath, e))?;
    }
    outfile.flush().map_err(|e| FetchError::disk(outpath, e))
}
