//! Linear ordering shared by every flat artifact of a run bundle.
//!
//! Cells are numbered with x varying fastest, then y, then z:
//! `index = k * nx * ny + j * nx + i`. The field file and both index files
//! go through [`linear_index`], so their orderings cannot drift apart.

use crate::domain::{Dimensions, MoleError, MoleResult};
use ndarray::Array3;

/// Maps `(i, j, k)` to its linear index.
///
/// # Panics
///
/// Panics when the coordinate lies outside `dimensions`; callers own that contract.
pub fn linear_index(dimensions: Dimensions, [i, j, k]: [usize; 3]) -> usize {
    assert!(
        dimensions.contains([i, j, k]),
        "cell ({i}, {j}, {k}) lies outside grid {dimensions}"
    );
    k * dimensions.nx * dimensions.ny + j * dimensions.nx + i
}

/// Inverse of [`linear_index`].
///
/// # Panics
///
/// Panics when `index >= nx * ny * nz`.
pub fn coordinates_for_index(dimensions: Dimensions, index: usize) -> [usize; 3] {
    assert!(
        index < dimensions.cell_count(),
        "linear index {index} lies outside grid {dimensions}"
    );
    let plane = dimensions.nx * dimensions.ny;
    let k = index / plane;
    let remainder = index % plane;
    [remainder % dimensions.nx, remainder / dimensions.nx, k]
}

/// Every cell coordinate, yielded in ascending linear-index order.
pub fn cell_coordinates(dimensions: Dimensions) -> impl Iterator<Item = [usize; 3]> {
    (0..dimensions.nz).flat_map(move |k| {
        (0..dimensions.ny).flat_map(move |j| (0..dimensions.nx).map(move |i| [i, j, k]))
    })
}

/// Rejects arrays whose shape differs from the declared grid before anything is written.
pub fn ensure_shape<T>(
    code: &'static str,
    label: &str,
    array: &Array3<T>,
    dimensions: Dimensions,
) -> MoleResult<()> {
    let actual = array.dim();
    if actual != dimensions.shape() {
        return Err(MoleError::shape_mismatch(
            code,
            format!(
                "{label} array has shape ({}, {}, {}) but grid declares {dimensions}",
                actual.0, actual.1, actual.2
            ),
        ));
    }
    Ok(())
}
