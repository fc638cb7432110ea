//! Compiled-in description of the dataset archive and the members the
//! downstream training code consumes.
//!
//! An upstream layout change is handled by editing [`CDR_CORPUS`]; nothing
//! in the pipeline discovers archive contents at runtime.

use std::path::{Path, PathBuf};

/// One file selected out of the extracted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetMember {
    /// Logical name used in logs and error messages
    pub name: &'static str,
    /// Path relative to the staging directory after extraction
    pub source: &'static str,
    /// File name inside the target data directory
    pub destination: &'static str,
}

impl DatasetMember {
    pub fn source_path(&self, extracted_root: &Path) -> PathBuf {
        self.source
            .split('/')
            .fold(extracted_root.to_path_buf(), |path, part| path.join(part))
    }

    pub fn destination_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.destination)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DatasetSpec {
    pub name: &'static str,
    pub url: &'static str,
    pub members: &'static [DatasetMember],
}

impl DatasetSpec {
    pub fn member(&self, name: &str) -> Option<&DatasetMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// BioCreative V Chemical Disease Relation corpus, release v010516.
pub const CDR_CORPUS: DatasetSpec = DatasetSpec {
    name: "cdr",
    url: "http://www.biocreative.org/media/store/files/2016/CDR_Data.zip",
    members: &[
        DatasetMember {
            name: "training",
            source: "CDR_Data/CDR.Corpus.v010516/CDR_TrainingSet.BioC.xml",
            destination: "CDR_TrainingSet.BioC.xml",
        },
        DatasetMember {
            name: "development",
            source: "CDR_Data/CDR.Corpus.v010516/CDR_DevelopmentSet.BioC.xml",
            destination: "CDR_DevelopmentSet.BioC.xml",
        },
        DatasetMember {
            name: "test",
            source: "CDR_Data/CDR.Corpus.v010516/CDR_TestSet.BioC.xml",
            destination: "CDR_TestSet.BioC.xml",
        },
    ],
};
