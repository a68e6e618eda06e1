//! # Interpolation Helpers
//!
//! Blend curves shared by the noise kernels, the region sampler and the
//! personality derivation.

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

/// Inverse of [`lerp`]: where `value` sits between `a` and `b`.
///
/// Returns zero for a degenerate range.
#[inline]
pub fn inverse_lerp<T: Float>(a: T, b: T, value: T) -> T {
    if a == b {
        T::zero()
    } else {
        (value - a) / (b - a)
    }
}

/// Trilinear interpolation of the eight corners of a unit cell.
///
/// Corners are indexed `c[x][y][z]` with 0 the low side of each axis.
#[inline]
pub fn trilerp(c: &[[[f64; 2]; 2]; 2], tx: f64, ty: f64, tz: f64) -> f64 {
    let x00 = lerp(c[0][0][0], c[1][0][0], tx);
    let x10 = lerp(c[0][1][0], c[1][1][0], tx);
    let x01 = lerp(c[0][0][1], c[1][0][1], tx);
    let x11 = lerp(c[0][1][1], c[1][1][1], tx);
    let y0 = lerp(x00, x10, ty);
    let y1 = lerp(x01, x11, ty);
    lerp(y0, y1, tz)
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn smooth(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Derivative of [`smooth`].
#[inline]
pub fn smooth_derivative(t: f64) -> f64 {
    30.0 * t * t * (t * (t - 2.0) + 1.0)
}

/// A closed interval that seed fractions are mapped into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Value at fraction 0.
    pub min: f64,
    /// Value at fraction 1.
    pub max: f64,
}

impl FloatRange {
    /// Creates a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that always resolves to `value`.
    pub const fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Maps a fraction in [0, 1] onto the range.
    pub fn at(&self, fraction: f64) -> f64 {
        lerp(self.min, self.max, fraction)
    }

    /// Maps a fraction onto the range after raising it to `exponent`.
    ///
    /// Exponents above one bias toward `min`.
    pub fn at_pow(&self, fraction: f64, exponent: f64) -> f64 {
        lerp(self.min, self.max, fraction.powf(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_hits_endpoints_flat() {
        assert_eq!(smooth(0.0), 0.0);
        assert_eq!(smooth(1.0), 1.0);
        assert_eq!(smooth_derivative(0.0), 0.0);
        assert_eq!(smooth_derivative(1.0), 0.0);
        assert!((smooth(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn trilerp_of_constant_is_constant() {
        let c = [[[0.37; 2]; 2]; 2];
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (0.25, 0.5, 0.75), (0.99, 0.01, 0.5)] {
            assert!((trilerp(&c, x, y, z) - 0.37).abs() < 1e-12);
        }
    }

    #[test]
    fn trilerp_reaches_each_corner() {
        let mut c = [[[0.0; 2]; 2]; 2];
        c[1][0][1] = 1.0;
        assert_eq!(trilerp(&c, 1.0, 0.0, 1.0), 1.0);
        assert_eq!(trilerp(&c, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(trilerp(&c, 0.5, 0.0, 0.5), 0.25);
    }

    #[test]
    fn ranges_map_fractions() {
        let range = FloatRange::new(2.0, 4.0);
        assert_eq!(range.at(0.5), 3.0);
        assert_eq!(range.at_pow(0.5, 2.0), 2.5);
        assert_eq!(FloatRange::fixed(1.5).at(0.9), 1.5);
        assert_eq!(inverse_lerp(2.0, 4.0, 3.0), 0.5);
        assert_eq!(inverse_lerp(1.0, 1.0, 3.0), 0.0);
    }
}
