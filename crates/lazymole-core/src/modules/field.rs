//! Scalar field artifact: one value per line in linear-index order.

use super::index::{cell_coordinates, coordinates_for_index, ensure_shape, linear_index};
use super::serialization::{format_scientific_f64, write_line_artifact};
use crate::domain::{Dimensions, MoleError, MoleResult, ParserResult};
use ndarray::Array3;
use std::fs;
use std::path::Path;

pub const FIELD_VALUE_PRECISION: usize = 5;

/// Flattens `field` so that position `idx` holds the value of the cell mapping to `idx`.
pub fn linearize_field(field: &Array3<f64>, dimensions: Dimensions) -> MoleResult<Vec<f64>> {
    ensure_shape("INPUT.FIELD_SHAPE", "field", field, dimensions)?;

    let mut values = vec![0.0; dimensions.cell_count()];
    for cell in cell_coordinates(dimensions) {
        values[linear_index(dimensions, cell)] = field[cell];
    }
    Ok(values)
}

pub fn write_field_artifact(
    path: &Path,
    field: &Array3<f64>,
    dimensions: Dimensions,
) -> MoleResult<usize> {
    let values = linearize_field(field, dimensions)?;
    write_line_artifact(
        path,
        values
            .iter()
            .map(|value| format_scientific_f64(*value, FIELD_VALUE_PRECISION)),
    )
    .map_err(|source| {
        MoleError::io_system(
            "IO.FIELD_WRITE",
            format!("failed to write field artifact '{}': {}", path.display(), source),
        )
    })?;
    Ok(values.len())
}

pub fn read_field_artifact(
    path: &Path,
    dimensions: Dimensions,
    skip: usize,
) -> MoleResult<Array3<f64>> {
    let source = fs::read_to_string(path).map_err(|source| {
        MoleError::io_system(
            "IO.FIELD_READ",
            format!("failed to read field artifact '{}': {}", path.display(), source),
        )
    })?;
    parse_field_source(&source, dimensions, skip)
}

/// Rebuilds the 3-D field from flat text, ignoring the first `skip` header lines.
///
/// The value count is checked against the grid before the array is allocated.
pub fn parse_field_source(
    source: &str,
    dimensions: Dimensions,
    skip: usize,
) -> ParserResult<Array3<f64>> {
    let values = source
        .lines()
        .enumerate()
        .skip(skip)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_index, line)| {
            let trimmed = line.trim();
            trimmed.parse::<f64>().map_err(|_| {
                MoleError::parse(
                    "PARSE.FIELD_VALUE",
                    format!(
                        "invalid field value '{}' at line {}",
                        trimmed,
                        line_index + 1
                    ),
                )
            })
        })
        .collect::<ParserResult<Vec<_>>>()?;

    if dimensions.checked_cell_count() != Some(values.len()) {
        let needed = dimensions
            .checked_cell_count()
            .map_or_else(|| "more".to_string(), |count| count.to_string());
        return Err(MoleError::shape_mismatch(
            "INPUT.FIELD_VALUE_COUNT",
            format!(
                "field artifact holds {} values but grid {} needs {}",
                values.len(),
                dimensions,
                needed
            ),
        ));
    }

    let mut field = Array3::<f64>::zeros(dimensions.shape());
    for (index, value) in values.into_iter().enumerate() {
        field[coordinates_for_index(dimensions, index)] = value;
    }
    Ok(field)
}
