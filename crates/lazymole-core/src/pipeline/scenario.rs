//! Channel scenario: inflow through the `i = 0` plane, outflow through `i = nx - 1`.

use crate::domain::Dimensions;
use ndarray::{Array3, s};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMasks {
    pub source: Array3<bool>,
    pub target: Array3<bool>,
}

pub fn channel_masks(dimensions: Dimensions) -> RegionMasks {
    let mut source = Array3::from_elem(dimensions.shape(), false);
    let mut target = Array3::from_elem(dimensions.shape(), false);
    source.slice_mut(s![0, .., ..]).fill(true);
    target.slice_mut(s![dimensions.nx - 1, .., ..]).fill(true);
    RegionMasks { source, target }
}

pub fn uniform_field(dimensions: Dimensions, value: f64) -> Array3<f64> {
    Array3::from_elem(dimensions.shape(), value)
}

#[cfg(test)]
mod tests {
    use super::{channel_masks, uniform_field};
    use crate::domain::Dimensions;
    use crate::modules::index::linear_index;
    use crate::modules::mask::{Region, masked_indices};

    #[test]
    fn channel_planes_cover_inlet_and_outlet() {
        let dimensions = Dimensions::new(40, 20, 10);
        let masks = channel_masks(dimensions);

        let source = masked_indices(Region::Source, &masks.source, dimensions).expect("source");
        let target = masked_indices(Region::Target, &masks.target, dimensions).expect("target");

        assert_eq!(source.len(), 200);
        assert_eq!(target.len(), 200);
        assert!(source.iter().all(|index| index % 40 == 0));
        assert!(target.iter().all(|index| index % 40 == 39));
        assert_eq!(target.last().copied(), Some(linear_index(dimensions, [39, 19, 9])));
    }

    #[test]
    fn single_column_channel_overlaps_source_and_target() {
        let dimensions = Dimensions::new(1, 2, 1);
        let masks = channel_masks(dimensions);
        assert_eq!(masks.source, masks.target);
    }

    #[test]
    fn uniform_field_has_grid_shape() {
        let field = uniform_field(Dimensions::new(2, 3, 4), -1.5);
        assert_eq!(field.dim(), (2, 3, 4));
        assert!(field.iter().all(|value| *value == -1.5));
    }
}
