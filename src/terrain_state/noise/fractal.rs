//! # Fractal Noise
//!
//! Octave summation and the per-field noise configuration built on it.
//!
//! [`NoiseOptions`] is the serialisable description of a field, with its
//! frequency given as a range. At world creation every range is collapsed by
//! a seed fraction into a [`FractalNoise`], which is what samplers evaluate.

use std::sync::Arc;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

use super::{interpolation::lerp, FloatRange, HashTable, NoiseMethod, NoiseSample};

/// Upper bound on octave counts. Eight octaves at lacunarity 2 already
/// multiply the base frequency by 128.
pub const MAX_OCTAVES: u32 = 8;

/// Sums `octaves` layers of `method`, normalised back to a single octave's range.
///
/// # Arguments
/// * `method` - Kernel family and dimensionality
/// * `table` - Permutation table of the world
/// * `point` - Sample position
/// * `frequency` - Frequency of the first octave
/// * `octaves` - Layer count, clamped to `1..=MAX_OCTAVES`
/// * `lacunarity` - Frequency multiplier per octave
/// * `persistence` - Amplitude multiplier per octave; positive, as [`NoiseOptions::validate`] enforces
///
/// # Returns
/// The weighted sum divided by the total amplitude.
pub fn sum(
    method: NoiseMethod,
    table: &HashTable,
    point: Point3<f64>,
    frequency: f64,
    octaves: u32,
    lacunarity: f64,
    persistence: f64,
) -> NoiseSample {
    let mut frequency = frequency;
    let mut total = method.sample(table, point, frequency);
    let mut amplitude = 1.0;
    let mut range = 1.0;
    for _ in 1..octaves.clamp(1, MAX_OCTAVES) {
        frequency *= lacunarity;
        amplitude *= persistence;
        range += amplitude;
        total += method.sample(table, point, frequency) * amplitude;
    }
    total * (1.0 / range)
}

/// Frequency perturbation driven by a secondary Perlin map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftOptions {
    /// Fractional frequency increase at full drift.
    pub amount: f64,
    /// Frequency of the drift map itself.
    pub scale: f64,
}

fn default_stretch() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// Configuration of one noise field, before the seed has been applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseOptions {
    /// Kernel family and dimensionality.
    pub method: NoiseMethod,
    /// Base frequency range; the seed picks a point inside it.
    pub frequency: FloatRange,
    /// Number of octaves.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Output scale applied when noise is converted to integer density.
    pub scale: f64,
    /// Per-axis multiplier applied to coordinates before sampling.
    #[serde(default = "default_stretch")]
    pub stretch: [f64; 3],
    /// Optional per-column frequency drift.
    #[serde(default)]
    pub drift: Option<DriftOptions>,
}

impl NoiseOptions {
    /// A drift-free field with unit stretch.
    pub fn new(
        method: NoiseMethod,
        frequency: FloatRange,
        octaves: u32,
        lacunarity: f64,
        persistence: f64,
        scale: f64,
    ) -> Self {
        Self {
            method,
            frequency,
            octaves,
            lacunarity,
            persistence,
            scale,
            stretch: default_stretch(),
            drift: None,
        }
    }

    /// Adds a drift map to the field.
    pub fn with_drift(mut self, amount: f64, scale: f64) -> Self {
        self.drift = Some(DriftOptions { amount, scale });
        self
    }

    /// Replaces the per-axis stretch.
    pub fn with_stretch(mut self, stretch: [f64; 3]) -> Self {
        self.stretch = stretch;
        self
    }

    /// Rejects options the kernel cannot evaluate sensibly.
    ///
    /// # Arguments
    /// * `name` - Field name used in the error message
    pub fn validate(&self, name: &str) -> TerrainResult<()> {
        let invalid = |reason: String| Err(TerrainError::InvalidConfig(format!("{name}: {reason}")));
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return invalid(format!(
                "octaves must be within 1..={MAX_OCTAVES}, got {}",
                self.octaves
            ));
        }
        if !(1..=3).contains(&self.method.dimensions) {
            return invalid(format!(
                "dimensions must be 1, 2 or 3, got {}",
                self.method.dimensions
            ));
        }
        let finite_positive = |v: f64| v.is_finite() && v > 0.0;
        if !finite_positive(self.frequency.min) || !finite_positive(self.frequency.max) {
            return invalid(format!("frequency {:?} must be positive", self.frequency));
        }
        if !finite_positive(self.lacunarity) {
            return invalid(format!("lacunarity must be positive, got {}", self.lacunarity));
        }
        // A non-positive persistence can cancel the amplitude total to zero.
        if !finite_positive(self.persistence) {
            return invalid(format!("persistence must be positive, got {}", self.persistence));
        }
        if !self.scale.is_finite() || self.stretch.iter().any(|s| !s.is_finite()) {
            return invalid("scale and stretch must be finite".into());
        }
        if let Some(drift) = &self.drift {
            if !drift.amount.is_finite() || !finite_positive(drift.scale) {
                return invalid(format!("drift {drift:?} is out of range"));
            }
        }
        Ok(())
    }

    /// Collapses the frequency range with a seed fraction.
    pub fn resolve(&self, fraction: f64) -> FractalNoise {
        FractalNoise {
            method: self.method,
            frequency: self.frequency.at(fraction),
            octaves: self.octaves.clamp(1, MAX_OCTAVES),
            lacunarity: self.lacunarity,
            persistence: self.persistence,
            scale: self.scale,
            stretch: self.stretch,
            drift: self.drift,
        }
    }
}

/// A noise field with every seed-dependent choice already made.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalNoise {
    /// Kernel family and dimensionality.
    pub method: NoiseMethod,
    /// Base frequency.
    pub frequency: f64,
    /// Octave count.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Output scale for integer conversion.
    pub scale: f64,
    /// Per-axis coordinate multiplier.
    pub stretch: [f64; 3],
    /// Optional frequency drift.
    pub drift: Option<DriftOptions>,
}

impl FractalNoise {
    /// Base frequency at horizontal position `(x, z)` after drift.
    ///
    /// The drift map's magnitude is used, so strongly negative and strongly
    /// positive drift both push toward the upper frequency bound.
    pub fn frequency_at(&self, table: &HashTable, x: f64, z: f64) -> f64 {
        match self.drift {
            Some(drift) => {
                let map = NoiseMethod::PERLIN_2D
                    .sample(table, Point3::new(x, z, 0.0), drift.scale)
                    .value
                    .abs();
                lerp(self.frequency, self.frequency * (1.0 + drift.amount), map)
            }
            None => self.frequency,
        }
    }

    /// Samples the field in three dimensions.
    pub fn sample(&self, table: &HashTable, point: Point3<f64>) -> NoiseSample {
        let frequency = self.frequency_at(table, point.x, point.z);
        let stretched = Point3::new(
            point.x * self.stretch[0],
            point.y * self.stretch[1],
            point.z * self.stretch[2],
        );
        sum(
            self.method,
            table,
            stretched,
            frequency,
            self.octaves,
            self.lacunarity,
            self.persistence,
        )
    }

    /// Samples the field over the horizontal plane, feeding `(x, z)` into the
    /// kernel's first two axes.
    pub fn sample_2d(&self, table: &HashTable, x: f64, z: f64) -> NoiseSample {
        self.sample(table, Point3::new(x, z, 0.0))
    }

    /// Converts a sample into integer density: `floor((v + 1) * scale / 2)`.
    pub fn quantize(&self, value: f64) -> i32 {
        quantize(value, self.scale)
    }
}

/// Converts a noise value in [-1, 1] into integer density in `[0, scale]`.
#[inline]
pub fn quantize(value: f64, scale: f64) -> i32 {
    ((value + 1.0) * scale / 2.0).floor() as i32
}

/// A field bound to its permutation table so it can stand alone as a
/// [`noise::NoiseFn`].
#[derive(Clone, Debug)]
pub struct BoundNoise {
    table: Arc<HashTable>,
    field: FractalNoise,
}

impl BoundNoise {
    /// Binds `field` to `table`.
    pub fn new(table: Arc<HashTable>, field: FractalNoise) -> Self {
        Self { table, field }
    }

    /// The bound field.
    pub fn field(&self) -> &FractalNoise {
        &self.field
    }
}

impl noise::NoiseFn<f64, 3> for BoundNoise {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.field
            .sample(&self.table, Point3::new(point[0], point[1], point[2]))
            .value
    }
}

impl noise::NoiseFn<f64, 2> for BoundNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.field.sample_2d(&self.table, point[0], point[1]).value
    }
}
