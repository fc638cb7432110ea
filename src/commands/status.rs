use crate::core::dataset::DatasetSpec;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStatus {
    pub name: String,
    pub path: PathBuf,
    /// Size in bytes, `None` when the file is absent
    pub bytes: Option<u64>,
}

impl MemberStatus {
    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }
}

pub fn collect_status(dataset: &DatasetSpec, data_dir: &Path) -> Vec<MemberStatus> {
    dataset
        .members
        .iter()
        .map(|member| {
            let path = member.destination_path(data_dir);
            let bytes = std::fs::metadata(&path)
                .ok()
                .filter(|m| m.is_file())
                .map(|m| m.len());
            MemberStatus {
                name: member.name.to_string(),
                path,
                bytes,
            }
        })
        .collect()
}

pub fn show_status(dataset: &DatasetSpec, data_dir: &Path, format: &str) -> Result<()> {
    let statuses = collect_status(dataset, data_dir);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&statuses)?),
        "text" => {
            println!("Dataset '{}' in {}:", dataset.name, data_dir.display());
            for status in &statuses {
                match status.bytes {
                    Some(bytes) => println!(
                        "  ✓ {} ({})",
                        status.path.display(),
                        crate::utils::fs::format_size(bytes)
                    ),
                    None => println!("  ✗ {} (missing)", status.path.display()),
                }
            }
        }
        other => bail!("unknown output format '{other}' (expected text or json)"),
    }

    let missing = statuses.iter().filter(|s| !s.is_present()).count();
    if missing > 0 {
        bail!("{missing} dataset file(s) missing; run `cdrfetch` to download them");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::CDR_CORPUS;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_status_reports_missing_members() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("CDR_TrainingSet.BioC.xml"), b"12345").unwrap();

        let statuses = collect_status(&CDR_CORPUS, temp.path());

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].name, "training");
        assert_eq!(statuses[0].bytes, Some(5));
        assert!(!statuses[1].is_present());
        assert!(!statuses[2].is_present());
    }

    #[test]
    fn test_show_status_fails_when_incomplete() {
        let temp = tempfile::tempdir().unwrap();
        assert!(show_status(&CDR_CORPUS, temp.path(), "text").is_err());

        for member in CDR_CORPUS.members {
            std::fs::write(member.destination_path(temp.path()), b"<collection/>").unwrap();
        }
        assert!(show_status(&CDR_CORPUS, temp.path(), "json").is_ok());
        assert!(show_status(&CDR_CORPUS, temp.path(), "yaml").is_err());
    }
}
