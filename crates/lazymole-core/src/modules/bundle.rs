//! Artifact names and consistency checks for one run directory.

use super::config::SolverConfig;
use super::field::read_field_artifact;
use super::mask::{Region, ensure_strictly_ascending, read_index_artifact};
use super::rundir::RunDirectory;
use crate::domain::{BundleArtifact, Dimensions, MoleError, MoleResult};
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "config.yaml";
pub const DEFAULT_FOLDER_NAME: &str = "lazymole";
pub const FIELD_ARTIFACT: &str = "field.dat";
pub const SOURCE_ARTIFACT: &str = "source.dat";
pub const TARGET_ARTIFACT: &str = "target.dat";
pub const PATH_ARTIFACT: &str = "path.dat";
pub const RESISTANCE_ARTIFACT: &str = "hres.dat";
pub const SUMMARY_ARTIFACT: &str = "summary.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub config: String,
    pub field: String,
    pub source: String,
    pub target: String,
    pub path: String,
    pub resistance: String,
    pub summary: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            config: DEFAULT_CONFIG_NAME.to_string(),
            field: FIELD_ARTIFACT.to_string(),
            source: SOURCE_ARTIFACT.to_string(),
            target: TARGET_ARTIFACT.to_string(),
            path: PATH_ARTIFACT.to_string(),
            resistance: RESISTANCE_ARTIFACT.to_string(),
            summary: SUMMARY_ARTIFACT.to_string(),
        }
    }
}

impl ArtifactNames {
    pub fn with_config(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            ..Self::default()
        }
    }

    /// Names recorded in a descriptor; the summary keeps its default name.
    pub fn from_config(config_name: impl Into<String>, config: &SolverConfig) -> Self {
        Self {
            config: config_name.into(),
            field: config.input.field.file.clone(),
            source: config.input.source.file.clone(),
            target: config.input.target.file.clone(),
            path: config.output.path.file.clone(),
            resistance: config.output.resistance.file.clone(),
            ..Self::default()
        }
    }

    /// Inputs written before the solver runs, in write order.
    pub fn inputs(&self) -> Vec<BundleArtifact> {
        [&self.field, &self.source, &self.target, &self.config]
            .into_iter()
            .map(BundleArtifact::new)
            .collect()
    }

    /// Files the solver itself is expected to produce.
    pub fn solver_outputs(&self) -> Vec<BundleArtifact> {
        [&self.path, &self.resistance]
            .into_iter()
            .map(BundleArtifact::new)
            .collect()
    }
}

/// A run directory together with the names of the files it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBundle {
    run_dir: RunDirectory,
    names: ArtifactNames,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReport {
    pub run_dir: PathBuf,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub field_values: usize,
    pub log_field: bool,
    pub source_cells: usize,
    pub target_cells: usize,
    /// Expected solver outputs already present in the run directory.
    pub solver_outputs: Vec<PathBuf>,
}

impl RunBundle {
    pub fn new(run_dir: RunDirectory, names: ArtifactNames) -> Self {
        Self { run_dir, names }
    }

    pub fn run_dir(&self) -> &RunDirectory {
        &self.run_dir
    }

    pub fn names(&self) -> &ArtifactNames {
        &self.names
    }

    pub fn config_path(&self) -> PathBuf {
        self.run_dir.artifact_path(&self.names.config)
    }

    pub fn field_path(&self) -> PathBuf {
        self.run_dir.artifact_path(&self.names.field)
    }

    pub fn source_path(&self) -> PathBuf {
        self.run_dir.artifact_path(&self.names.source)
    }

    pub fn target_path(&self) -> PathBuf {
        self.run_dir.artifact_path(&self.names.target)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.run_dir.artifact_path(&self.names.summary)
    }

    /// Re-reads a bundle from disk through its descriptor and verifies that
    /// every file agrees with the declared grid.
    ///
    /// The descriptor's geometry is validated before any data file is read.
    pub fn check(run_dir: RunDirectory, config_name: &str) -> MoleResult<BundleReport> {
        let config = SolverConfig::load(&run_dir.artifact_path(config_name))?;
        let dimensions = config.geometry()?.dimensions();
        let names = ArtifactNames::from_config(config_name, &config);

        let missing = names
            .inputs()
            .into_iter()
            .filter(|artifact| !run_dir.path().join(&artifact.relative_path).is_file())
            .map(|artifact| artifact.relative_path.display().to_string())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(MoleError::io_system(
                "IO.BUNDLE_INPUT",
                format!(
                    "run directory '{}' is missing bundle inputs: {}",
                    run_dir.path().display(),
                    missing.join(", ")
                ),
            ));
        }

        let field = read_field_artifact(
            &run_dir.artifact_path(&names.field),
            dimensions,
            config.input.field.skip,
        )?;
        let source = read_checked_indices(&run_dir, &names.source, Region::Source, dimensions)?;
        let target = read_checked_indices(&run_dir, &names.target, Region::Target, dimensions)?;

        let solver_outputs = names
            .solver_outputs()
            .into_iter()
            .map(|artifact| artifact.relative_path)
            .filter(|relative_path| run_dir.path().join(relative_path).is_file())
            .collect();

        Ok(BundleReport {
            run_dir: run_dir.path().to_path_buf(),
            nx: dimensions.nx,
            ny: dimensions.ny,
            nz: dimensions.nz,
            field_values: field.len(),
            log_field: config.input.field.log,
            source_cells: source.len(),
            target_cells: target.len(),
            solver_outputs,
        })
    }
}

fn read_checked_indices(
    run_dir: &RunDirectory,
    file: &str,
    region: Region,
    dimensions: Dimensions,
) -> MoleResult<Vec<usize>> {
    let indices = read_index_artifact(&run_dir.artifact_path(file), region)?;
    if let Some(outside) = indices
        .iter()
        .find(|index| **index >= dimensions.cell_count())
    {
        return Err(MoleError::shape_mismatch(
            "INPUT.MASK_INDEX_RANGE",
            format!(
                "{} index {} lies outside grid {} ({} cells)",
                region,
                outside,
                dimensions,
                dimensions.cell_count()
            ),
        ));
    }
    ensure_strictly_ascending(region, &indices).map_err(|error| {
        MoleError::parse("PARSE.MASK_ORDER", error.message().to_string())
    })?;
    Ok(indices)
}
