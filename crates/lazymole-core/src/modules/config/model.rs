use serde::{Deserialize, Serialize};

// Field order is the sorted key order the solver's reference configs use.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub grid: GridSection,
    pub input: InputSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// The solver reads this key with a space, not as `cell-size`.
    #[serde(rename = "cell size")]
    pub cell_size: CellSizeSection,
    pub dimensions: DimensionsSection,
    pub refinement: RefinementSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSizeSection {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionsSection {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementSection {
    pub refx: u32,
    pub refy: u32,
    pub refz: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSection {
    pub field: FieldInput,
    pub source: FileEntry,
    pub target: FileEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInput {
    pub file: String,
    pub log: bool,
    #[serde(default)]
    pub skip: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: FileEntry,
    pub resistance: FileEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub file: String,
}

impl FileEntry {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}
