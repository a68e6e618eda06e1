//! Noise samples carrying an analytic derivative.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

use cgmath::{Vector3, Zero};

/// A noise value together with its gradient.
///
/// Samples compose with ordinary arithmetic so fractal sums and kernel
/// blends can carry derivatives through without extra bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSample {
    /// Scalar noise value.
    pub value: f64,
    /// Partial derivatives along x, y and z.
    pub derivative: Vector3<f64>,
}

impl NoiseSample {
    /// Creates a sample from its parts.
    pub fn new(value: f64, derivative: Vector3<f64>) -> Self {
        Self { value, derivative }
    }

    /// A sample with a flat gradient.
    pub fn constant(value: f64) -> Self {
        Self {
            value,
            derivative: Vector3::zero(),
        }
    }
}

impl Default for NoiseSample {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl Add for NoiseSample {
    type Output = NoiseSample;

    fn add(self, rhs: NoiseSample) -> NoiseSample {
        NoiseSample::new(self.value + rhs.value, self.derivative + rhs.derivative)
    }
}

impl AddAssign for NoiseSample {
    fn add_assign(&mut self, rhs: NoiseSample) {
        self.value += rhs.value;
        self.derivative += rhs.derivative;
    }
}

impl Mul<f64> for NoiseSample {
    type Output = NoiseSample;

    fn mul(self, rhs: f64) -> NoiseSample {
        NoiseSample::new(self.value * rhs, self.derivative * rhs)
    }
}

impl MulAssign<f64> for NoiseSample {
    fn mul_assign(&mut self, rhs: f64) {
        self.value *= rhs;
        self.derivative *= rhs;
    }
}

/// Shifts the value only; a constant offset has no gradient.
impl Sub<f64> for NoiseSample {
    type Output = NoiseSample;

    fn sub(self, rhs: f64) -> NoiseSample {
        NoiseSample::new(self.value - rhs, self.derivative)
    }
}
