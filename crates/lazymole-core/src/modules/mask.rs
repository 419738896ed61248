//! Region masks flattened to the ascending linear indices of their true cells.

use super::index::{cell_coordinates, ensure_shape, linear_index};
use super::serialization::write_line_artifact;
use crate::domain::{Dimensions, MoleError, MoleResult, ParserResult};
use ndarray::Array3;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Source,
    Target,
}

impl Region {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }

    const fn shape_code(self) -> &'static str {
        match self {
            Self::Source => "INPUT.SOURCE_SHAPE",
            Self::Target => "INPUT.TARGET_SHAPE",
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

pub fn masked_indices(
    region: Region,
    mask: &Array3<bool>,
    dimensions: Dimensions,
) -> MoleResult<Vec<usize>> {
    ensure_shape(region.shape_code(), region.as_str(), mask, dimensions)?;

    let indices = cell_coordinates(dimensions)
        .filter(|cell| mask[*cell])
        .map(|cell| linear_index(dimensions, cell))
        .collect::<Vec<_>>();
    ensure_strictly_ascending(region, &indices)?;
    Ok(indices)
}

/// The solver reads index files in order, so a non-ascending sequence is never written.
pub fn ensure_strictly_ascending(region: Region, indices: &[usize]) -> MoleResult<()> {
    if let Some(position) = indices.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(MoleError::internal(
            "RUN.MASK_ORDER",
            format!(
                "{} indices are not strictly ascending at position {}: {} then {}",
                region,
                position,
                indices[position],
                indices[position + 1]
            ),
        ));
    }
    Ok(())
}

pub fn write_mask_artifact(
    path: &Path,
    region: Region,
    mask: &Array3<bool>,
    dimensions: Dimensions,
) -> MoleResult<Vec<usize>> {
    let indices = masked_indices(region, mask, dimensions)?;
    write_line_artifact(path, indices.iter().map(usize::to_string)).map_err(|source| {
        MoleError::io_system(
            "IO.MASK_WRITE",
            format!(
                "failed to write {} artifact '{}': {}",
                region,
                path.display(),
                source
            ),
        )
    })?;
    Ok(indices)
}

pub fn read_index_artifact(path: &Path, region: Region) -> MoleResult<Vec<usize>> {
    let source = fs::read_to_string(path).map_err(|source| {
        MoleError::io_system(
            "IO.MASK_READ",
            format!(
                "failed to read {} artifact '{}': {}",
                region,
                path.display(),
                source
            ),
        )
    })?;
    parse_index_source(region, &source)
}

pub fn parse_index_source(region: Region, source: &str) -> ParserResult<Vec<usize>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_index, line)| {
            line.trim().parse::<usize>().map_err(|_| {
                MoleError::parse(
                    "PARSE.MASK_INDEX",
                    format!(
                        "invalid {} index '{}' at line {}",
                        region,
                        line.trim(),
                        line_index + 1
                    ),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        Region, ensure_strictly_ascending, masked_indices, parse_index_source,
        read_index_artifact, write_mask_artifact,
    };
    use crate::domain::{Dimensions, MoleErrorCategory};
    use crate::modules::index::{cell_coordinates, linear_index};
    use ndarray::Array3;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn single_true_cell_maps_to_linear_index() {
        let dimensions = Dimensions::new(4, 3, 2);
        for cell in cell_coordinates(dimensions) {
            let mut mask = Array3::from_elem(dimensions.shape(), false);
            mask[cell] = true;

            let indices =
                masked_indices(Region::Source, &mask, dimensions).expect("shape should match");
            assert_eq!(indices, vec![linear_index(dimensions, cell)]);
        }
    }

    #[test]
    fn plane_mask_produces_ascending_indices() {
        let dimensions = Dimensions::new(3, 2, 2);
        let mut mask = Array3::from_elem(dimensions.shape(), false);
        for j in 0..2 {
            for k in 0..2 {
                mask[[0, j, k]] = true;
            }
        }

        let indices = masked_indices(Region::Source, &mask, dimensions).expect("valid mask");
        assert_eq!(indices, vec![0, 3, 6, 9]);
    }

    #[test]
    fn empty_mask_writes_empty_artifact() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("target.dat");
        let dimensions = Dimensions::new(2, 2, 2);
        let mask = Array3::from_elem(dimensions.shape(), false);

        let indices = write_mask_artifact(&path, Region::Target, &mask, dimensions)
            .expect("empty mask is legal");

        assert!(indices.is_empty());
        assert_eq!(fs::read_to_string(&path).expect("readable"), "");
        assert!(
            read_index_artifact(&path, Region::Target)
                .expect("empty artifact should parse")
                .is_empty()
        );
    }

    #[test]
    fn mask_artifact_lists_one_unsigned_index_per_line() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("target.dat");
        let dimensions = Dimensions::new(2, 2, 1);
        let mut mask = Array3::from_elem(dimensions.shape(), false);
        mask[[1, 0, 0]] = true;
        mask[[1, 1, 0]] = true;

        write_mask_artifact(&path, Region::Target, &mask, dimensions).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("readable"), "1\n3\n");
        assert_eq!(
            read_index_artifact(&path, Region::Target).expect("read back"),
            vec![1, 3]
        );
    }

    #[test]
    fn mismatched_mask_shape_is_rejected() {
        let mask = Array3::from_elem((3, 3, 3), true);
        let error = masked_indices(Region::Target, &mask, Dimensions::new(3, 3, 4))
            .expect_err("shape mismatch should fail");
        assert_eq!(error.category(), MoleErrorCategory::ShapeMismatch);
        assert_eq!(error.code(), "INPUT.TARGET_SHAPE");
    }

    #[test]
    fn ascending_check_flags_duplicates_and_descents() {
        assert!(ensure_strictly_ascending(Region::Source, &[0, 4, 9]).is_ok());
        assert!(ensure_strictly_ascending(Region::Source, &[]).is_ok());

        let error = ensure_strictly_ascending(Region::Source, &[0, 4, 4])
            .expect_err("duplicate should fail");
        assert_eq!(error.category(), MoleErrorCategory::Internal);
        assert!(ensure_strictly_ascending(Region::Target, &[5, 2]).is_err());
    }

    #[test]
    fn parse_rejects_negative_indices() {
        let error = parse_index_source(Region::Source, "0\n-1\n").expect_err("negative index");
        assert_eq!(error.category(), MoleErrorCategory::Parse);
    }
}
