//! Voxel-space bounds of a generation request, aligned to the sampling stride.

use cgmath::{Point2, Point3, Vector3};

use crate::error::{TerrainError, TerrainResult};
use crate::terrain_state::voxels::CHUNK_DIMENSION;

/// Coarse sampling stride for a sample rate.
///
/// Horizontal axes are sampled at twice the vertical spacing.
pub fn sample_stride(sample_rate: i32) -> Vector3<i32> {
    Vector3::new(sample_rate * 2, sample_rate, sample_rate * 2)
}

/// An axis-aligned box of voxels, `min` inclusive and `max` exclusive.
///
/// Two regions with the same bounds are the same region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// Minimum corner, inclusive.
    pub min: Point3<i32>,
    /// Maximum corner, exclusive.
    pub max: Point3<i32>,
}

impl Region {
    /// Creates a region and checks it against the sampling stride.
    ///
    /// # Errors
    /// [`TerrainError::UnalignedRegion`] if any extent is empty or not a
    /// whole number of strides.
    pub fn new(min: Point3<i32>, max: Point3<i32>, sample_rate: i32) -> TerrainResult<Self> {
        let region = Region { min, max };
        region.validate(sample_rate)?;
        Ok(region)
    }

    /// The region covering a full column of `height_in_chunks` chunks.
    pub fn for_column(position: Point2<i32>, height_in_chunks: i32, sample_rate: i32) -> TerrainResult<Self> {
        let min = Point3::new(position.x * CHUNK_DIMENSION, 0, position.y * CHUNK_DIMENSION);
        let max = Point3::new(
            min.x + CHUNK_DIMENSION,
            height_in_chunks * CHUNK_DIMENSION,
            min.z + CHUNK_DIMENSION,
        );
        Region::new(min, max, sample_rate)
    }

    /// Extent per axis.
    pub fn size(&self) -> Vector3<i32> {
        self.max - self.min
    }

    /// Number of voxels covered.
    pub fn volume(&self) -> usize {
        let size = self.size();
        (size.x.max(0) * size.y.max(0) * size.z.max(0)) as usize
    }

    /// Whether a world voxel lies inside.
    pub fn contains(&self, voxel: Point3<i32>) -> bool {
        (0..3).all(|axis| voxel[axis] >= self.min[axis] && voxel[axis] < self.max[axis])
    }

    /// Whole coarse cells per axis at `sample_rate`.
    pub fn cells(&self, sample_rate: i32) -> Vector3<i32> {
        let stride = sample_stride(sample_rate.max(1));
        let size = self.size();
        Vector3::new(size.x / stride.x, size.y / stride.y, size.z / stride.z)
    }

    /// Extent of the dense grid an expansion populates: whole cells only.
    pub fn dense_size(&self, sample_rate: i32) -> Vector3<i32> {
        let stride = sample_stride(sample_rate.max(1));
        let cells = self.cells(sample_rate);
        Vector3::new(cells.x * stride.x, cells.y * stride.y, cells.z * stride.z)
    }

    /// Checks that the region is non-empty and stride aligned.
    pub fn validate(&self, sample_rate: i32) -> TerrainResult<()> {
        let stride = sample_stride(sample_rate);
        let size = self.size();
        let aligned = sample_rate > 0
            && (0..3).all(|axis| size[axis] > 0 && size[axis] % stride[axis] == 0);
        if aligned {
            Ok(())
        } else {
            Err(TerrainError::UnalignedRegion { size, stride })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_regions_span_the_world_height() {
        let region = Region::for_column(Point2::new(-1, 2), 8, 4).unwrap();
        assert_eq!(region.min, Point3::new(-16, 0, 32));
        assert_eq!(region.size(), Vector3::new(16, 128, 16));
        assert_eq!(region.cells(4), Vector3::new(2, 32, 2));
        assert_eq!(region.dense_size(4), region.size());
        assert!(region.contains(Point3::new(-1, 127, 47)));
        assert!(!region.contains(Point3::new(0, 0, 32)));
    }

    #[test]
    fn unaligned_regions_are_rejected() {
        let err = Region::new(Point3::new(0, 0, 0), Point3::new(12, 16, 16), 4).unwrap_err();
        assert!(matches!(err, TerrainError::UnalignedRegion { .. }));
        assert!(Region::new(Point3::new(0, 0, 0), Point3::new(16, 16, 16), 0).is_err());
        assert!(Region::new(Point3::new(0, 0, 0), Point3::new(0, 16, 16), 4).is_err());
    }

    #[test]
    fn dense_size_drops_the_remainder() {
        let region = Region {
            min: Point3::new(0, 0, 0),
            max: Point3::new(20, 10, 16),
        };
        assert_eq!(region.dense_size(4), Vector3::new(16, 8, 16));
        assert_eq!(region.volume(), 20 * 10 * 16);
    }

    #[test]
    fn identity_is_structural() {
        use std::collections::HashSet;
        let a = Region::for_column(Point2::new(0, 0), 4, 2).unwrap();
        let b = Region::for_column(Point2::new(0, 0), 4, 2).unwrap();
        let set: HashSet<Region> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
