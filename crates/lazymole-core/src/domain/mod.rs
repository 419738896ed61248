pub mod errors;

pub use errors::{MoleError, MoleErrorCategory, MoleResult, ParserResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Edge lengths of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl CellSize {
    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }
}

/// Number of cells along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Dimensions {
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    pub const fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub const fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// `None` when the cell count does not fit in `usize`.
    pub const fn checked_cell_count(&self) -> Option<usize> {
        match self.nx.checked_mul(self.ny) {
            Some(plane) => plane.checked_mul(self.nz),
            None => None,
        }
    }

    pub const fn contains(&self, [i, j, k]: [usize; 3]) -> bool {
        i < self.nx && j < self.ny && k < self.nz
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.nx, self.ny, self.nz)
    }
}

/// Per-axis sub-grid multipliers handed through to the solver untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Refinement {
    pub rx: u32,
    pub ry: u32,
    pub rz: u32,
}

impl Refinement {
    pub const fn new(rx: u32, ry: u32, rz: u32) -> Self {
        Self { rx, ry, rz }
    }
}

impl Default for Refinement {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Validated grid description shared by every artifact of a run bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    cell_size: CellSize,
    dimensions: Dimensions,
    refinement: Refinement,
}

impl GridGeometry {
    pub fn new(
        cell_size: CellSize,
        dimensions: Dimensions,
        refinement: Refinement,
    ) -> MoleResult<Self> {
        for (axis, value) in [
            ("dx", cell_size.dx),
            ("dy", cell_size.dy),
            ("dz", cell_size.dz),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MoleError::input_validation(
                    "INPUT.GRID_CELL_SIZE",
                    format!("cell size {axis} must be a positive finite number, got {value}"),
                ));
            }
        }

        for (axis, value) in [
            ("nx", dimensions.nx),
            ("ny", dimensions.ny),
            ("nz", dimensions.nz),
        ] {
            if value == 0 {
                return Err(MoleError::input_validation(
                    "INPUT.GRID_DIMENSIONS",
                    format!("cell count {axis} must be at least 1"),
                ));
            }
        }

        if dimensions.checked_cell_count().is_none() {
            return Err(MoleError::input_validation(
                "INPUT.GRID_DIMENSIONS",
                format!("grid {dimensions} has more cells than can be addressed"),
            ));
        }

        for (axis, value) in [
            ("refx", refinement.rx),
            ("refy", refinement.ry),
            ("refz", refinement.rz),
        ] {
            if value == 0 {
                return Err(MoleError::input_validation(
                    "INPUT.GRID_REFINEMENT",
                    format!("refinement factor {axis} must be at least 1"),
                ));
            }
        }

        Ok(Self {
            cell_size,
            dimensions,
            refinement,
        })
    }

    pub const fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub const fn refinement(&self) -> Refinement {
        self.refinement
    }
}

/// Typed values reported by the solver on its console.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub min_resistance: f64,
    pub target_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    pub relative_path: PathBuf,
}

impl BundleArtifact {
    pub fn new(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }
}
