//! Solver configuration descriptor (`config.yaml`).
//!
//! Every file entry is a bare name relative to the run directory so a bundle
//! stays valid when the directory is moved.

mod model;

pub use model::{
    CellSizeSection, DimensionsSection, FieldInput, FileEntry, GridSection, InputSection,
    OutputSection, RefinementSection, SolverConfig,
};

use super::bundle::ArtifactNames;
use crate::domain::{
    CellSize, Dimensions, GridGeometry, MoleError, MoleResult, ParserResult, Refinement,
};
use std::fs;
use std::path::Path;

impl SolverConfig {
    pub fn new(geometry: &GridGeometry, names: &ArtifactNames, log: bool, skip: usize) -> Self {
        let cell_size = geometry.cell_size();
        let dimensions = geometry.dimensions();
        let refinement = geometry.refinement();

        Self {
            grid: GridSection {
                cell_size: CellSizeSection {
                    dx: cell_size.dx,
                    dy: cell_size.dy,
                    dz: cell_size.dz,
                },
                dimensions: DimensionsSection {
                    nx: dimensions.nx,
                    ny: dimensions.ny,
                    nz: dimensions.nz,
                },
                refinement: RefinementSection {
                    refx: refinement.rx,
                    refy: refinement.ry,
                    refz: refinement.rz,
                },
            },
            input: InputSection {
                field: FieldInput {
                    file: names.field.clone(),
                    log,
                    skip,
                },
                source: FileEntry::new(names.source.clone()),
                target: FileEntry::new(names.target.clone()),
            },
            output: OutputSection {
                path: FileEntry::new(names.path.clone()),
                resistance: FileEntry::new(names.resistance.clone()),
            },
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        let dimensions = self.grid.dimensions;
        Dimensions::new(dimensions.nx, dimensions.ny, dimensions.nz)
    }

    /// Validates the descriptor's grid the same way construction does.
    pub fn geometry(&self) -> MoleResult<GridGeometry> {
        let grid = &self.grid;
        GridGeometry::new(
            CellSize::new(grid.cell_size.dx, grid.cell_size.dy, grid.cell_size.dz),
            self.dimensions(),
            Refinement::new(grid.refinement.refx, grid.refinement.refy, grid.refinement.refz),
        )
    }

    pub fn to_yaml(&self) -> MoleResult<String> {
        serde_yaml::to_string(self).map_err(|source| {
            MoleError::internal(
                "RUN.CONFIG_SERIALIZE",
                format!("failed to serialize solver configuration: {}", source),
            )
        })
    }

    pub fn from_yaml(source: &str) -> ParserResult<Self> {
        serde_yaml::from_str(source).map_err(|source| {
            MoleError::parse(
                "PARSE.CONFIG",
                format!("invalid solver configuration: {}", source),
            )
        })
    }

    /// Writes the descriptor, replacing any file already at `path`.
    pub fn write(&self, path: &Path) -> MoleResult<()> {
        let content = self.to_yaml()?;
        fs::write(path, content).map_err(|source| {
            MoleError::io_system(
                "IO.CONFIG_WRITE",
                format!(
                    "failed to write solver configuration '{}': {}",
                    path.display(),
                    source
                ),
            )
        })
    }

    pub fn load(path: &Path) -> MoleResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| {
            MoleError::io_system(
                "IO.CONFIG_READ",
                format!(
                    "failed to read solver configuration '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        Self::from_yaml(&source)
    }
}
