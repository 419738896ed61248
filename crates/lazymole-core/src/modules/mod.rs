pub mod bundle;
pub mod config;
pub mod field;
pub mod index;
pub mod mask;
pub mod result;
pub mod rundir;
pub mod serialization;
pub mod solver;

mod traits;

pub use traits::SolverRunner;
