//! The acquire → extract → place → clean lifecycle.
//!
//! Each stage is a fallible operation. The runner executes them in order,
//! stops at the first fatal error and reports the stage it happened in.
//! Cleanup is the only stage whose failure is downgraded to a warning,
//! because by then the dataset is already in place.

use crate::core::config::Settings;
use crate::core::dataset::DatasetSpec;
use crate::core::extract;
use crate::core::fetch::Fetch;
use crate::core::place::{self, PlacedFile};
use crate::core::staging::{self, StagingArea};
use crate::error::FetchError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Fetch,
    Extract,
    Place,
    Clean,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Place => "place",
            Stage::Clean => "clean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Staged,
    Fetched,
    Extracted,
    Placed,
    Cleaned,
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Cleaned | PipelineState::Failed(_))
    }
}

#[derive(Error, Debug)]
#[error("{stage} stage failed")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: FetchError,
}

impl PipelineError {
    pub fn state(&self) -> PipelineState {
        PipelineState::Failed(self.stage)
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub state: PipelineState,
    pub staging_dir: PathBuf,
    pub archive: PathBuf,
    pub extracted_files: usize,
    pub placed: Vec<PlacedFile>,
    /// Set when the staging directory could not be removed
    pub cleanup_warning: Option<FetchError>,
}

pub struct Pipeline<'a, F: Fetch> {
    settings: &'a Settings,
    dataset: &'a DatasetSpec,
    fetcher: F,
}

impl<'a, F: Fetch> Pipeline<'a, F> {
    pub fn new(settings: &'a Settings, dataset: &'a DatasetSpec, fetcher: F) -> Self {
        Self {
            settings,
            dataset,
            fetcher,
        }
    }

    pub fn staging_path(&self) -> PathBuf {
        if self.settings.unique_staging {
            staging::unique_path(&self.settings.staging_dir)
        } else {
            self.settings.staging_dir.clone()
        }
    }

    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let mut state = PipelineState::Start;
        tracing::info!(dataset = self.dataset.name, "starting acquisition");

        let staging_path = self.staging_path();
        let staging = advance(&mut state, Stage::Setup, PipelineState::Staged, || {
            StagingArea::create(&staging_path)
        })?;

        let archive = advance(&mut state, Stage::Fetch, PipelineState::Fetched, || {
            self.fetcher.fetch(&self.settings.url, staging.path())
        })?;

        let extracted_files = advance(&mut state, Stage::Extract, PipelineState::Extracted, || {
            extract::extract_archive(&archive, staging.path())
        })?;

        let placed = advance(&mut state, Stage::Place, PipelineState::Placed, || {
            place::place_members(self.dataset, staging.path(), &self.settings.data_dir)
        })?;

        let staging_dir = staging.path().to_path_buf();
        let cleanup_warning = match staging.remove() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(stage = %Stage::Clean, error = %e, "staging directory left behind");
                Some(e)
            }
        };
        state = PipelineState::Cleaned;
        tracing::info!(?state, placed = placed.len(), "acquisition finished");

        Ok(PipelineReport {
            state,
            staging_dir,
            archive,
            extracted_files,
            placed,
            cleanup_warning,
        })
    }
}

fn advance<T, Op>(
    state: &mut PipelineState,
    stage: Stage,
    next: PipelineState,
    op: Op,
) -> Result<T, PipelineError>
where
    Op: FnOnce() -> crate::error::Result<T>,
{
    match op() {
        Ok(value) => {
            *state = next;
            tracing::info!(%stage, state = ?next, "stage completed");
            Ok(value)
        }
        Err(source) => {
            *state = PipelineState::Failed(stage);
            tracing::error!(%stage, error = %source, "stage failed");
            Err(PipelineError { stage, source })
        }
    }
}
