//! Input bundles for the LazyMole hydraulic-connectivity solver.
//!
//! A run turns a 3-D scalar field and two region masks into flat,
//! index-addressed files plus a YAML descriptor, launches the solver
//! against that directory and reads the minimum hydraulic resistance and
//! target id back from its console output.

pub mod domain;
pub mod modules;
pub mod pipeline;

pub use domain::{
    CellSize, Dimensions, GridGeometry, MoleError, MoleErrorCategory, MoleResult, Refinement,
    RunResult,
};
pub use pipeline::{ConnectivityPipeline, PipelineOptions};
