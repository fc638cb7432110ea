use crate::error::{FetchError, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Ephemeral working directory owned by a single pipeline run.
///
/// Dropping the value leaves the directory in place: only [`StagingArea::remove`]
/// deletes it, and the pipeline calls that after placement has succeeded.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
}

impl StagingArea {
    pub fn create(path: &Path) -> Result<Self> {
        fs::create_dir_exclusive(path)?;
        tracing::debug!(path = %path.display(), "created staging directory");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(self) -> Result<()> {
        fs::remove_dir_recursive(&self.path).map_err(|source| FetchError::CleanupWarning {
            path: self.path.clone(),
            source,
        })
    }
}

const RUN_STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const RUN_STAMP_LEN: usize = 15;

/// `downloads` becomes `downloads-20261017T093512-4242`.
pub fn unique_path(base: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format(RUN_STAMP_FORMAT);
    let mut name = base
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!("-{stamp}-{}", std::process::id()));
    base.with_file_name(name)
}

/// Leftover staging directories for `base`: the directory itself and any
/// per-run siblings created with [`unique_path`].
pub fn find_leftovers(base: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if base.is_dir() {
        found.push(base.to_path_buf());
    }

    let Some(base_name) = base.file_name().and_then(|n| n.to_str()) else {
        return Ok(found);
    };
    let prefix = format!("{base_name}-");
    let parent = match base.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Ok(found);
    }

    let mut siblings = Vec::new();
    for entry in std::fs::read_dir(parent)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let is_run_dir = name
            .strip_prefix(&prefix)
            .is_some_and(is_run_suffix);
        if is_run_dir && entry.file_type()?.is_dir() {
            siblings.push(base.with_file_name(name));
        }
    }
    siblings.sort();
    found.extend(siblings);

    Ok(found)
}

/// Whether `suffix` is exactly the `<stamp>-<pid>` part [`unique_path`] appends.
fn is_run_suffix(suffix: &str) -> bool {
    let Some((stamp, pid)) = suffix.split_once('-') else {
        return false;
    };
    stamp.len() == RUN_STAMP_LEN
        && stamp
            .char_indices()
            .all(|(i, c)| if i == 8 { c == 'T' } else { c.is_ascii_digit() })
        && chrono::NaiveDateTime::parse_from_str(stamp, RUN_STAMP_FORMAT).is_ok()
        && !pid.is_empty()
        && pid.bytes().all(|b| b.is_ascii_digit())
        && pid.parse::<u32>().is_ok()
}
