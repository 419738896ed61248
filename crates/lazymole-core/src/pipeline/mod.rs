//! One-shot connectivity run: write the bundle, invoke the solver, read its answer.

pub mod scenario;

use crate::domain::{CellSize, Dimensions, GridGeometry, MoleResult, Refinement, RunResult};
use crate::modules::bundle::{ArtifactNames, DEFAULT_CONFIG_NAME, DEFAULT_FOLDER_NAME, RunBundle};
use crate::modules::config::SolverConfig;
use crate::modules::field::write_field_artifact;
use crate::modules::index::ensure_shape;
use crate::modules::mask::{Region, write_mask_artifact};
use crate::modules::result::extract_and_summarize;
use crate::modules::rundir::{RunDirectory, ensure_plain_name};
use crate::modules::solver::{DEFAULT_EXECUTABLE, ProcessSolver, SolverSettings};
use crate::modules::SolverRunner;
use ndarray::Array3;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub refinement: Refinement,
    /// Header lines the solver skips at the top of the field file.
    pub skip: usize,
    /// Whether field values are already log-transformed; recorded only.
    pub log: bool,
    pub config_name: String,
    pub folder_name: String,
    pub executable: PathBuf,
    pub solver: SolverSettings,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            refinement: Refinement::default(),
            skip: 0,
            log: true,
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            solver: SolverSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectivityPipeline {
    geometry: GridGeometry,
    bundle: RunBundle,
    executable: PathBuf,
    solver: SolverSettings,
}

impl ConnectivityPipeline {
    /// Validates every input, then writes the field, source, target and
    /// descriptor files into `base_path/<folder_name>`.
    ///
    /// Nothing touches the disk until all shapes agree with `dimensions`.
    pub fn construct(
        base_path: &Path,
        field: &Array3<f64>,
        source: &Array3<bool>,
        target: &Array3<bool>,
        cell_size: CellSize,
        dimensions: Dimensions,
        options: PipelineOptions,
    ) -> MoleResult<Self> {
        let geometry = GridGeometry::new(cell_size, dimensions, options.refinement)?;
        ensure_plain_name("INPUT.CONFIG_NAME", "configuration", &options.config_name)?;
        ensure_shape("INPUT.FIELD_SHAPE", "field", field, dimensions)?;
        ensure_shape("INPUT.SOURCE_SHAPE", "source", source, dimensions)?;
        ensure_shape("INPUT.TARGET_SHAPE", "target", target, dimensions)?;

        let run_dir = RunDirectory::prepare(base_path, &options.folder_name)?;
        let bundle = RunBundle::new(run_dir, ArtifactNames::with_config(options.config_name));

        let values = write_field_artifact(&bundle.field_path(), field, dimensions)?;
        debug!(values, path = %bundle.field_path().display(), "field artifact written");
        let source_cells =
            write_mask_artifact(&bundle.source_path(), Region::Source, source, dimensions)?;
        let target_cells =
            write_mask_artifact(&bundle.target_path(), Region::Target, target, dimensions)?;

        SolverConfig::new(&geometry, bundle.names(), options.log, options.skip)
            .write(&bundle.config_path())?;

        info!(
            run_dir = %bundle.run_dir().path().display(),
            grid = %dimensions,
            source_cells = source_cells.len(),
            target_cells = target_cells.len(),
            "run bundle written"
        );

        Ok(Self {
            geometry,
            bundle,
            executable: options.executable,
            solver: options.solver,
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn bundle(&self) -> &RunBundle {
        &self.bundle
    }

    pub fn run_dir(&self) -> &Path {
        self.bundle.run_dir().path()
    }

    pub fn process_solver(&self) -> ProcessSolver {
        ProcessSolver::new(&self.executable, self.solver.clone())
    }

    /// Runs the configured solver executable and blocks until it finishes.
    pub fn run(&self) -> MoleResult<RunResult> {
        self.run_with(&self.process_solver())
    }

    pub fn run_with<S: SolverRunner>(&self, solver: &S) -> MoleResult<RunResult> {
        let output = solver.invoke(self.run_dir())?;
        extract_and_summarize(&output.stdout, &self.bundle.summary_path())
    }
}
