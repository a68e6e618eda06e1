//! # Sample Region
//!
//! One noise field sampled over a [`Region`].
//!
//! Sampling happens in two passes. The coarse pass evaluates the fractal
//! noise at every lattice point of the stride grid, one z-slice of lattice
//! points per call. The expansion pass trilinearly interpolates each coarse
//! cell into the dense grid, again one z-slice of cells per call, and
//! quantizes the result with the field's scale.
//!
//! ```text
//! unsampled --sample_slice()*--> sampled --expand_slice()*--> complete
//! ```

use cgmath::{Point3, Vector3};

use crate::terrain_state::noise::{interpolation::trilerp, quantize, FractalNoise, HashTable, NoiseMethod};

use super::{
    region::{sample_stride, Region},
    sample_set::SamplePool,
};

/// Coarse samples and their dense expansion for one field.
#[derive(Debug)]
pub struct SampleRegion {
    region: Region,
    field: FractalNoise,
    stride: Vector3<i32>,
    cells: Vector3<i32>,
    samples: Vec<f64>,
    dense: Vec<i32>,
    sampled: bool,
    complete: bool,
}

fn product(v: Vector3<i32>) -> usize {
    (v.x.max(0) * v.y.max(0) * v.z.max(0)) as usize
}

impl SampleRegion {
    /// Checks buffers out of `pool` for sampling `field` over `region`.
    ///
    /// The region must already be validated against `sample_rate`.
    pub fn new(region: Region, sample_rate: i32, field: FractalNoise, pool: &mut SamplePool) -> Self {
        let cells = region.cells(sample_rate);
        let stride = sample_stride(sample_rate.max(1));
        let samples = pool.samples.checkout(product(cells + Vector3::new(1, 1, 1)));
        let dense = pool.dense.checkout(product(region.dense_size(sample_rate)));
        SampleRegion {
            region,
            field,
            stride,
            cells,
            samples,
            dense,
            sampled: false,
            complete: false,
        }
    }

    /// A zero-sized region that reports itself complete. Reads return 0.
    pub fn empty() -> Self {
        let origin = Point3::new(0, 0, 0);
        SampleRegion {
            region: Region { min: origin, max: origin },
            field: FractalNoise {
                method: NoiseMethod::PERLIN_2D,
                frequency: 1.0,
                octaves: 1,
                lacunarity: 2.0,
                persistence: 0.5,
                scale: 1.0,
                stretch: [1.0; 3],
                drift: None,
            },
            stride: Vector3::new(1, 1, 1),
            cells: Vector3::new(0, 0, 0),
            samples: Vec::new(),
            dense: Vec::new(),
            sampled: true,
            complete: true,
        }
    }

    /// Hands the buffers back to the pool.
    pub fn release(self, pool: &mut SamplePool) {
        pool.samples.checkin(self.samples);
        pool.dense.checkin(self.dense);
    }

    /// The sampled region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The field being sampled.
    pub fn field(&self) -> &FractalNoise {
        &self.field
    }

    /// Whole coarse cells per axis.
    pub fn cells(&self) -> Vector3<i32> {
        self.cells
    }

    /// Extent of the populated dense grid.
    pub fn dense_size(&self) -> Vector3<i32> {
        Vector3::new(
            self.cells.x * self.stride.x,
            self.cells.y * self.stride.y,
            self.cells.z * self.stride.z,
        )
    }

    /// Whether every coarse sample has been computed.
    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    /// Whether the dense grid has been populated.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of `sample_slice` calls needed to finish the coarse pass.
    pub fn sample_slices(&self) -> i32 {
        if self.cells.x <= 0 || self.cells.y <= 0 || self.cells.z <= 0 {
            0
        } else {
            self.cells.z + 1
        }
    }

    /// Number of `expand_slice` calls needed to finish the expansion.
    pub fn expand_slices(&self) -> i32 {
        if self.sample_slices() == 0 {
            0
        } else {
            self.cells.z
        }
    }

    fn sample_index(&self, i: i32, j: i32, k: i32) -> usize {
        let nx = self.cells.x + 1;
        let ny = self.cells.y + 1;
        (i + nx * (j + ny * k)) as usize
    }

    fn dense_index(&self, x: i32, y: i32, z: i32) -> usize {
        let size = self.dense_size();
        (x + size.x * (y + size.y * z)) as usize
    }

    /// Evaluates the noise at every lattice point with z-index `k`.
    pub fn sample_slice(&mut self, table: &HashTable, k: i32) {
        let z = f64::from(self.region.min.z + k * self.stride.z);
        for j in 0..=self.cells.y {
            let y = f64::from(self.region.min.y + j * self.stride.y);
            for i in 0..=self.cells.x {
                let x = f64::from(self.region.min.x + i * self.stride.x);
                let value = self.field.sample(table, Point3::new(x, y, z)).value;
                let index = self.sample_index(i, j, k);
                self.samples[index] = value;
            }
        }
    }

    /// Marks the coarse pass finished.
    pub fn mark_sampled(&mut self) {
        self.sampled = true;
    }

    /// Interpolates every coarse cell with z-index `ck` into the dense grid.
    pub fn expand_slice(&mut self, ck: i32) {
        debug_assert!(self.sampled, "expanding a field before it was sampled");
        let stride = self.stride;
        for cj in 0..self.cells.y {
            for ci in 0..self.cells.x {
                let mut corners = [[[0.0; 2]; 2]; 2];
                for (dx, plane) in corners.iter_mut().enumerate() {
                    for (dy, row) in plane.iter_mut().enumerate() {
                        for (dz, corner) in row.iter_mut().enumerate() {
                            *corner = self.samples[self.sample_index(
                                ci + dx as i32,
                                cj + dy as i32,
                                ck + dz as i32,
                            )];
                        }
                    }
                }

                for sz in 0..stride.z {
                    let tz = f64::from(sz) / f64::from(stride.z);
                    for sy in 0..stride.y {
                        let ty = f64::from(sy) / f64::from(stride.y);
                        for sx in 0..stride.x {
                            let tx = f64::from(sx) / f64::from(stride.x);
                            let value = trilerp(&corners, tx, ty, tz);
                            let index = self.dense_index(
                                ci * stride.x + sx,
                                cj * stride.y + sy,
                                ck * stride.z + sz,
                            );
                            self.dense[index] = quantize(value, self.field.scale);
                        }
                    }
                }
            }
        }
    }

    /// Marks the expansion finished.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Dense density at a position relative to the region's minimum corner.
    ///
    /// Positions outside the populated extent read as 0.
    pub fn get(&self, local: Point3<i32>) -> i32 {
        debug_assert!(self.complete, "reading a field before it was expanded");
        let size = self.dense_size();
        let inside = (0..3).all(|axis| local[axis] >= 0 && local[axis] < size[axis]);
        if !inside {
            return 0;
        }
        self.dense[self.dense_index(local.x, local.y, local.z)]
    }

    /// Dense density normalised by the field scale into roughly [0, 1].
    pub fn get_normalized(&self, local: Point3<i32>) -> f64 {
        if self.field.scale == 0.0 {
            return 0.0;
        }
        f64::from(self.get(local)) / self.field.scale
    }

    /// Overwrites every coarse sample, for expansion tests.
    #[cfg(test)]
    pub(crate) fn fill_samples(&mut self, value: f64) {
        self.samples.fill(value);
        self.sampled = true;
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, Point2};

    use super::*;
    use crate::terrain_state::generation::Seed;
    use crate::terrain_state::noise::{FloatRange, NoiseOptions};

    fn field() -> FractalNoise {
        NoiseOptions::new(NoiseMethod::SIMPLEX_3D, FloatRange::fixed(0.02), 3, 2.0, 0.5, 100.0).resolve(0.0)
    }

    fn sampled_region(pool: &mut SamplePool) -> (SampleRegion, HashTable) {
        let region = Region::for_column(Point2::new(1, -2), 2, 2).unwrap();
        let table = HashTable::new(Seed::from("regions").hash());
        let mut sample = SampleRegion::new(region, 2, field(), pool);
        for k in 0..sample.sample_slices() {
            sample.sample_slice(&table, k);
        }
        sample.mark_sampled();
        for k in 0..sample.expand_slices() {
            sample.expand_slice(k);
        }
        sample.mark_complete();
        (sample, table)
    }

    #[test]
    fn constant_corners_expand_to_the_constant() {
        let mut pool = SamplePool::default();
        let region = Region::for_column(Point2::new(0, 0), 1, 4).unwrap();
        let mut sample = SampleRegion::new(region, 4, field(), &mut pool);
        sample.fill_samples(0.3);
        for k in 0..sample.expand_slices() {
            sample.expand_slice(k);
        }
        sample.mark_complete();

        let expected = quantize(0.3, 100.0);
        let size = sample.dense_size();
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    assert_eq!(sample.get(Point3::new(x, y, z)), expected);
                }
            }
        }
    }

    #[test]
    fn lattice_points_match_direct_sampling() {
        let mut pool = SamplePool::default();
        let (sample, table) = sampled_region(&mut pool);
        let region = sample.region();
        let stride = sample_stride(2);
        for &(i, j, k) in &[(0, 0, 0), (1, 3, 1), (3, 7, 2)] {
            let local = Point3::new(i * stride.x, j * stride.y, k * stride.z);
            let world = region.min + local.to_vec();
            let direct = field().sample(&table, world.cast::<f64>().unwrap()).value;
            assert_eq!(sample.get(local), quantize(direct, 100.0));
        }
    }

    #[test]
    fn reads_outside_the_populated_extent_are_zero() {
        let mut pool = SamplePool::default();
        let (sample, _) = sampled_region(&mut pool);
        let size = sample.dense_size();
        assert_eq!(sample.get(Point3::new(size.x, 0, 0)), 0);
        assert_eq!(sample.get(Point3::new(0, -1, 0)), 0);
        assert_eq!(SampleRegion::empty().get(Point3::new(0, 0, 0)), 0);
    }

    #[test]
    fn buffers_return_to_the_pool() {
        let mut pool = SamplePool::default();
        let (sample, _) = sampled_region(&mut pool);
        sample.release(&mut pool);
        assert_eq!(pool.samples.available(), 1);
        assert_eq!(pool.dense.available(), 1);
        let _again = sampled_region(&mut pool);
        assert_eq!(pool.dense.allocations(), 1);
    }
}
