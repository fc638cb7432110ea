use crate::core::dataset::DatasetSpec;
use crate::error::{FetchError, Result};
use crate::utils::fs;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedFile {
    pub name: String,
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Copy every member of `dataset` from the extracted tree into `data_dir`.
///
/// All sources are checked and copied to temporary files before any
/// destination is replaced, so a missing member or a failed write leaves
/// `data_dir` exactly as it was. `data_dir` must already exist.
pub fn place_members(
    dataset: &DatasetSpec,
    extracted_root: &Path,
    data_dir: &Path,
) -> Result<Vec<PlacedFile>> {
    if !data_dir.is_dir() {
        return Err(FetchError::disk(
            data_dir,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "target data directory does not exist",
            ),
        ));
    }

    let mut plan = Vec::with_capacity(dataset.members.len());
    for member in dataset.members {
        let source = member.source_path(extracted_root);
        if !source.is_file() {
            return Err(FetchError::MissingSource {
                name: member.name.to_string(),
                path: source,
            });
        }
        plan.push((member, source, member.destination_path(data_dir)));
    }

    // Every copy lands in a temporary file first; nothing is renamed into
    // place until all members have been written.
    let mut staged = Vec::with_capacity(plan.len());
    for (member, source, destination) in plan {
        if destination.is_dir() {
            return Err(FetchError::disk(
                &destination,
                std::io::Error::other("destination is a directory"),
            ));
        }
        let (temp, bytes) = fs::copy_to_temp(&source, data_dir)?;
        staged.push((member, temp, destination, bytes));
    }

    let mut placed = Vec::with_capacity(staged.len());
    for (member, temp, destination, bytes) in staged {
        temp.persist(&destination)
            .map_err(|e| FetchError::disk(&destination, e.error))?;
        tracing::debug!(
            member = member.name,
            destination = %destination.display(),
            bytes,
            "placed dataset member"
        );
        placed.push(PlacedFile {
            name: member.name.to_string(),
            destination,
            bytes,
        });
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::{DatasetMember, CDR_CORPUS};
    use pretty_assertions::assert_eq;

    const SAMPLE: DatasetSpec = DatasetSpec {
        name: "sample",
        url: "http://mirror.test/sample.zip",
        members: &[
            DatasetMember {
                name: "first",
                source: "root/inner/first.xml",
                destination: "first.xml",
            },
            DatasetMember {
                name: "second",
                source: "root/inner/second.xml",
                destination: "second.xml",
            },
        ],
    };

    fn layout(root: &Path, members: &[(&str, &[u8])]) {
        for (relative, content) in members {
            let path = root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn test_place_copies_and_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let extracted = temp.path().join("downloads");
        let data = temp.path().join("data");
        std::fs::create_dir(&data).unwrap();
        layout(
            &extracted,
            &[("root/inner/first.xml", b"one"), ("root/inner/second.xml", b"two")],
        );
        std::fs::write(data.join("first.xml"), b"previous run").unwrap();

        let placed = place_members(&SAMPLE, &extracted, &data).unwrap();

        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].bytes, 3);
        assert_eq!(std::fs::read(data.join("first.xml")).unwrap(), b"one");
        assert_eq!(std::fs::read(data.join("second.xml")).unwrap(), b"two");
    }

    #[test]
    fn test_missing_member_places_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let extracted = temp.path().join("downloads");
        let data = temp.path().join("data");
        std::fs::create_dir(&data).unwrap();
        layout(&extracted, &[("root/inner/first.xml", b"one")]);

        let err = place_members(&SAMPLE, &extracted, &data).unwrap_err();

        match err {
            FetchError::MissingSource { name, .. } => assert_eq!(name, "second"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!data.join("first.xml").exists());
    }

    #[test]
    fn test_failed_write_on_second_member_keeps_previous_files() {
        let temp = tempfile::tempdir().unwrap();
        let extracted = temp.path().join("downloads");
        let data = temp.path().join("data");
        std::fs::create_dir(&data).unwrap();
        layout(
            &extracted,
            &[("root/inner/first.xml", b"one"), ("root/inner/second.xml", b"two")],
        );
        std::fs::write(data.join("first.xml"), b"previous run").unwrap();
        // A directory squatting on the second destination cannot be replaced.
        std::fs::create_dir(data.join("second.xml")).unwrap();

        let err = place_members(&SAMPLE, &extracted, &data).unwrap_err();

        assert!(matches!(err, FetchError::DiskError { .. }), "{err}");
        assert_eq!(std::fs::read(data.join("first.xml")).unwrap(), b"previous run");
        let mut names: Vec<_> = std::fs::read_dir(&data)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["first.xml", "second.xml"]);
    }

    #[test]
    fn test_missing_data_dir_is_not_created() {
        let temp = tempfile::tempdir().unwrap();
        let data = temp.path().join("data");

        let err = place_members(&CDR_CORPUS, temp.path(), &data).unwrap_err();
        assert!(matches!(err, FetchError::DiskError { .. }));
        assert!(!data.exists());
    }
}
