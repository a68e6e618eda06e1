//! # Noise Kernel
//!
//! Deterministic lattice noise driven by a single seeded permutation table.
//!
//! ## Families
//!
//! * **Value** - hashed lattice values blended on a quintic smoothstep
//! * **Perlin** - gradient dot products blended on the same curve
//! * **Simplex value** - hashed values with a radial falloff on a simplex lattice
//! * **Simplex** - gradient dot products with the same falloff
//!
//! Every family is implemented for 1, 2 and 3 dimensional input and returns a
//! [`NoiseSample`] carrying the value and its analytic derivative. Value
//! families are remapped to [-1, 1]; gradient families are scaled so their
//! extremes sit on the same bound.
//!
//! ## Fractal sums
//!
//! [`fractal::sum`] layers octaves of one family. Each octave multiplies
//! frequency by the lacunarity and amplitude by the persistence, and the
//! running sum is divided by the accumulated amplitude so the result keeps
//! the single-octave bound.
//!
//! ## Determinism
//!
//! All randomness comes from [`HashTable`], built once per world from the
//! seed. Given the same table every call is pure.

pub mod fractal;
pub mod hash_table;
pub mod interpolation;
mod perlin;
pub mod sample;
mod simplex;
mod value;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

pub use fractal::{quantize, sum, BoundNoise, DriftOptions, FractalNoise, NoiseOptions, MAX_OCTAVES};
pub use hash_table::{HashTable, HASH_MASK};
pub use interpolation::FloatRange;
pub use sample::NoiseSample;

/// The lattice family a noise method samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMethodType {
    /// Hashed lattice values.
    Value,
    /// Hashed lattice gradients.
    Perlin,
    /// Hashed values on a simplex lattice.
    SimplexValue,
    /// Hashed gradients on a simplex lattice.
    Simplex,
}

/// A noise family paired with the dimensionality of its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoiseMethod {
    /// The lattice family.
    pub kind: NoiseMethodType,
    /// Input dimensions, 1 through 3. Out-of-range values are clamped.
    pub dimensions: u8,
}

impl NoiseMethod {
    /// Two dimensional Perlin noise, used for height fields and the drift map.
    pub const PERLIN_2D: NoiseMethod = NoiseMethod::new(NoiseMethodType::Perlin, 2);
    /// Three dimensional simplex noise, used for density fields.
    pub const SIMPLEX_3D: NoiseMethod = NoiseMethod::new(NoiseMethodType::Simplex, 3);

    /// Creates a method selector.
    pub const fn new(kind: NoiseMethodType, dimensions: u8) -> Self {
        Self { kind, dimensions }
    }

    /// Every family in every dimensionality.
    pub fn all() -> [NoiseMethod; 12] {
        let kinds = [
            NoiseMethodType::Value,
            NoiseMethodType::Perlin,
            NoiseMethodType::SimplexValue,
            NoiseMethodType::Simplex,
        ];
        std::array::from_fn(|i| NoiseMethod::new(kinds[i / 3], (i % 3) as u8 + 1))
    }

    /// Samples a single octave at `point` scaled by `frequency`.
    ///
    /// Only the leading `dimensions` components of `point` are read.
    pub fn sample(&self, table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
        match (self.kind, self.dimensions.clamp(1, 3)) {
            (NoiseMethodType::Value, 1) => value::value_1d(table, point, frequency),
            (NoiseMethodType::Value, 2) => value::value_2d(table, point, frequency),
            (NoiseMethodType::Value, _) => value::value_3d(table, point, frequency),
            (NoiseMethodType::Perlin, 1) => perlin::perlin_1d(table, point, frequency),
            (NoiseMethodType::Perlin, 2) => perlin::perlin_2d(table, point, frequency),
            (NoiseMethodType::Perlin, _) => perlin::perlin_3d(table, point, frequency),
            (NoiseMethodType::SimplexValue, 1) => simplex::simplex_value_1d(table, point, frequency),
            (NoiseMethodType::SimplexValue, 2) => simplex::simplex_value_2d(table, point, frequency),
            (NoiseMethodType::SimplexValue, _) => simplex::simplex_value_3d(table, point, frequency),
            (NoiseMethodType::Simplex, 1) => simplex::simplex_1d(table, point, frequency),
            (NoiseMethodType::Simplex, 2) => simplex::simplex_2d(table, point, frequency),
            (NoiseMethodType::Simplex, _) => simplex::simplex_3d(table, point, frequency),
        }
    }

    /// Samples a single octave, keeping the derivative only when asked for.
    pub fn evaluate(
        &self,
        table: &HashTable,
        point: Point3<f64>,
        frequency: f64,
        with_derivative: bool,
    ) -> NoiseSample {
        let sample = self.sample(table, point, frequency);
        if with_derivative {
            sample
        } else {
            NoiseSample::constant(sample.value)
        }
    }
}

/// Splits a coordinate into its wrapped lattice cell and the offset inside it.
#[inline]
pub(crate) fn lattice(coordinate: f64) -> (i32, f64) {
    let floor = coordinate.floor();
    (wrap(floor), coordinate - floor)
}

/// Masks an integral lattice coordinate into the hash table's index range.
#[inline]
pub(crate) fn wrap(coordinate: f64) -> i32 {
    ((coordinate as i64) & HASH_MASK as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HashTable {
        HashTable::new(0x5eed)
    }

    #[test]
    fn every_method_is_listed_once() {
        let all = NoiseMethod::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn single_octaves_stay_in_unit_range() {
        let table = table();
        let mut rng = fastrand::Rng::with_seed(11);
        for method in NoiseMethod::all() {
            for _ in 0..2_000 {
                let point = Point3::new(
                    rng.f64() * 600.0 - 300.0,
                    rng.f64() * 600.0 - 300.0,
                    rng.f64() * 600.0 - 300.0,
                );
                let value = method.sample(&table, point, 1.0).value;
                assert!(
                    (-1.0 - 1e-9..=1.0 + 1e-9).contains(&value),
                    "{method:?} produced {value} at {point:?}"
                );
            }
        }
    }

    #[test]
    fn huge_coordinates_do_not_panic() {
        let table = table();
        let point = Point3::new(1.0e12, -3.0e15, 7.5e9);
        for method in NoiseMethod::all() {
            assert!(method.sample(&table, point, 1.0).value.is_finite());
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let table = table();
        let h = 1e-5;
        let point = Point3::new(3.3, 1.7, -2.45);
        for method in NoiseMethod::all() {
            let sample = method.sample(&table, point, 0.8);
            let ahead = method.sample(&table, Point3::new(point.x + h, point.y, point.z), 0.8);
            let behind = method.sample(&table, Point3::new(point.x - h, point.y, point.z), 0.8);
            let numeric = (ahead.value - behind.value) / (2.0 * h);
            assert!(
                (numeric - sample.derivative.x).abs() < 1e-3,
                "{method:?}: analytic {} numeric {numeric}",
                sample.derivative.x
            );
        }
    }

    #[test]
    fn value_only_evaluation_drops_derivative() {
        let table = table();
        let point = Point3::new(0.3, 0.6, 0.9);
        let sample = NoiseMethod::SIMPLEX_3D.evaluate(&table, point, 2.0, false);
        assert_eq!(sample.derivative, cgmath::Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(
            sample.value,
            NoiseMethod::SIMPLEX_3D.sample(&table, point, 2.0).value
        );
    }
}
