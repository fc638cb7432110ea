use crate::core::config::Settings;
use crate::core::staging;
use crate::utils::fs::{calculate_dir_size, format_size, remove_dir_recursive};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// A staging directory left behind by an earlier run
#[derive(Debug)]
pub struct Leftover {
    pub path: PathBuf,
    /// `None` when the directory could not be fully scanned
    pub size_bytes: Option<u64>,
}

impl Leftover {
    fn size_label(&self) -> String {
        self.size_bytes
            .map(format_size)
            .unwrap_or_else(|| "size unknown".to_string())
    }
}

pub fn list_leftovers(settings: &Settings) -> Result<Vec<Leftover>> {
    let paths = staging::find_leftovers(&settings.staging_dir).with_context(|| {
        format!(
            "could not scan for staging directories next to {}",
            settings.staging_dir.display()
        )
    })?;

    Ok(paths
        .into_iter()
        .map(|path| {
            let size_bytes = match calculate_dir_size(&path) {
                Ok(size) => Some(size),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "could not measure staging directory");
                    None
                }
            };
            Leftover { path, size_bytes }
        })
        .collect())
}

/// Show what would be removed
pub fn clean_dry_run(settings: &Settings) -> Result<()> {
    let leftovers = list_leftovers(settings)?;

    if leftovers.is_empty() {
        println!("No staging directories found.");
        return Ok(());
    }

    let total: u64 = leftovers.iter().filter_map(|l| l.size_bytes).sum();
    println!("Staging directories to remove ({} total):", format_size(total));
    for leftover in &leftovers {
        println!("  {} ({})", leftover.path.display(), leftover.size_label());
    }
    println!();
    println!("Run 'cdrfetch clean --confirm' to remove them.");

    Ok(())
}

/// Remove every leftover staging directory
pub fn clean_execute(settings: &Settings) -> Result<usize> {
    let leftovers = list_leftovers(settings)?;

    if leftovers.is_empty() {
        println!("No staging directories found.");
        return Ok(0);
    }

    let mut removed = 0;
    let mut failed = Vec::new();
    for leftover in &leftovers {
        match remove_dir_recursive(&leftover.path) {
            Ok(()) => {
                println!("  ✓ Removed {}", leftover.path.display());
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %leftover.path.display(), error = %e, "failed to remove staging directory");
                failed.push(leftover.path.display().to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("could not remove: {}", failed.join(", "));
    }

    println!("✅ Removed {removed} staging director{}", if removed == 1 { "y" } else { "ies" });
    Ok(removed)
}
