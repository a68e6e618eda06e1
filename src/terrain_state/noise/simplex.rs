//! Simplex lattice noise.
//!
//! Instead of blending the corners of a square cell, each corner of the
//! enclosing simplex (segment, triangle, tetrahedron) contributes a radially
//! falling-off kernel. Only `dimensions + 1` corners are visited per sample.

use std::f64::consts::FRAC_1_SQRT_2;

use cgmath::{InnerSpace, Point3, Vector3};

use super::{wrap, HashTable, NoiseSample, HASH_MASK};

/// Skews a point from triangle space into square space.
const TRIANGLES_TO_SQUARES: f64 = 0.3660254037844386;
/// Unskews a lattice corner from square space back into triangle space.
const SQUARES_TO_TRIANGLES: f64 = 0.21132486540518713;

const SKEW_3D: f64 = 1.0 / 3.0;
const UNSKEW_3D: f64 = 1.0 / 6.0;

const SIMPLEX_SCALE_1D: f64 = 64.0 / 27.0;
const SIMPLEX_SCALE_2D: f64 = 32.99077398303957;
const SIMPLEX_SCALE_3D: f64 = 37.83722724161131;

/// Value kernels peak at 1/8 per corner; this maps the hashed sum onto [-1, 1].
const SIMPLEX_VALUE_SCALE: f64 = 8.0 * 2.0 / HASH_MASK as f64;

const FRAC_1_SQRT_3: f64 = 0.5773502691896258;

const GRADIENTS_1D: [f64; 2] = [1.0, -1.0];
const GRADIENTS_1D_MASK: i32 = 1;

const GRADIENTS_2D: [Vector3<f64>; 8] = [
    Vector3::new(1.0, 0.0, 0.0),
    Vector3::new(-1.0, 0.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, -1.0, 0.0),
    Vector3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
    Vector3::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
    Vector3::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0),
    Vector3::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0),
];
const GRADIENTS_2D_MASK: i32 = 7;

const E: f64 = FRAC_1_SQRT_2;
const C: f64 = FRAC_1_SQRT_3;

// Twelve edge directions twice over, then the eight cube corners.
const GRADIENTS_3D: [Vector3<f64>; 32] = [
    Vector3::new(E, E, 0.0),
    Vector3::new(-E, E, 0.0),
    Vector3::new(E, -E, 0.0),
    Vector3::new(-E, -E, 0.0),
    Vector3::new(E, 0.0, E),
    Vector3::new(-E, 0.0, E),
    Vector3::new(E, 0.0, -E),
    Vector3::new(-E, 0.0, -E),
    Vector3::new(0.0, E, E),
    Vector3::new(0.0, -E, E),
    Vector3::new(0.0, E, -E),
    Vector3::new(0.0, -E, -E),
    Vector3::new(E, E, 0.0),
    Vector3::new(-E, E, 0.0),
    Vector3::new(E, -E, 0.0),
    Vector3::new(-E, -E, 0.0),
    Vector3::new(E, 0.0, E),
    Vector3::new(-E, 0.0, E),
    Vector3::new(E, 0.0, -E),
    Vector3::new(-E, 0.0, -E),
    Vector3::new(0.0, E, E),
    Vector3::new(0.0, -E, E),
    Vector3::new(0.0, E, -E),
    Vector3::new(0.0, -E, -E),
    Vector3::new(C, C, C),
    Vector3::new(-C, C, C),
    Vector3::new(C, -C, C),
    Vector3::new(-C, -C, C),
    Vector3::new(C, C, -C),
    Vector3::new(-C, C, -C),
    Vector3::new(C, -C, -C),
    Vector3::new(-C, -C, -C),
];
const GRADIENTS_3D_MASK: i32 = 31;

/// What a simplex corner contributes: a hashed value or a hashed gradient.
#[derive(Clone, Copy)]
enum Kernel {
    Value,
    Gradient,
}

fn hash_2d(table: &HashTable, ix: f64, iy: f64) -> i32 {
    table.get((table.get(wrap(ix)) + wrap(iy)) & HASH_MASK)
}

fn hash_3d(table: &HashTable, ix: f64, iy: f64, iz: f64) -> i32 {
    let xy = table.get((table.get(wrap(ix)) + wrap(iy)) & HASH_MASK);
    table.get((xy + wrap(iz)) & HASH_MASK)
}

fn part_1d(table: &HashTable, x: f64, ix: f64, kernel: Kernel) -> NoiseSample {
    let x = x - ix;
    let f = 1.0 - x * x;
    let f2 = f * f;
    let f3 = f * f2;
    let hash = table.get(wrap(ix));
    match kernel {
        Kernel::Value => {
            let h = hash as f64;
            NoiseSample::new(h * f3, Vector3::new(-6.0 * h * x * f2, 0.0, 0.0))
        }
        Kernel::Gradient => {
            let g = GRADIENTS_1D[(hash & GRADIENTS_1D_MASK) as usize];
            let v = g * x;
            NoiseSample::new(v * f3, Vector3::new(g * f3 - 6.0 * v * x * f2, 0.0, 0.0))
        }
    }
}

fn part_2d(table: &HashTable, point: Point3<f64>, ix: f64, iy: f64, kernel: Kernel) -> NoiseSample {
    let unskew = (ix + iy) * SQUARES_TO_TRIANGLES;
    let offset = Vector3::new(point.x - ix + unskew, point.y - iy + unskew, 0.0);
    let f = 0.5 - offset.magnitude2();
    if f <= 0.0 {
        return NoiseSample::default();
    }

    let f2 = f * f;
    let f3 = f * f2;
    let hash = hash_2d(table, ix, iy);
    match kernel {
        Kernel::Value => {
            let h = hash as f64;
            NoiseSample::new(h * f3, offset * (-6.0 * h * f2))
        }
        Kernel::Gradient => {
            let g = GRADIENTS_2D[(hash & GRADIENTS_2D_MASK) as usize];
            let v = g.dot(offset);
            NoiseSample::new(v * f3, g * f3 + offset * (-6.0 * v * f2))
        }
    }
}

fn part_3d(
    table: &HashTable,
    point: Point3<f64>,
    corner: Vector3<f64>,
    kernel: Kernel,
) -> NoiseSample {
    let unskew = (corner.x + corner.y + corner.z) * UNSKEW_3D;
    let offset = Vector3::new(
        point.x - corner.x + unskew,
        point.y - corner.y + unskew,
        point.z - corner.z + unskew,
    );
    let f = 0.5 - offset.magnitude2();
    if f <= 0.0 {
        return NoiseSample::default();
    }

    let f2 = f * f;
    let f3 = f * f2;
    let hash = hash_3d(table, corner.x, corner.y, corner.z);
    match kernel {
        Kernel::Value => {
            let h = hash as f64;
            NoiseSample::new(h * f3, offset * (-6.0 * h * f2))
        }
        Kernel::Gradient => {
            let g = GRADIENTS_3D[(hash & GRADIENTS_3D_MASK) as usize];
            let v = g.dot(offset);
            NoiseSample::new(v * f3, g * f3 + offset * (-6.0 * v * f2))
        }
    }
}

fn sum_1d(table: &HashTable, point: Point3<f64>, frequency: f64, kernel: Kernel) -> NoiseSample {
    let x = point.x * frequency;
    let ix = x.floor();
    let mut sample = part_1d(table, x, ix, kernel);
    sample += part_1d(table, x, ix + 1.0, kernel);
    sample.derivative *= frequency;
    sample
}

fn sum_2d(table: &HashTable, point: Point3<f64>, frequency: f64, kernel: Kernel) -> NoiseSample {
    let point = Point3::new(point.x * frequency, point.y * frequency, 0.0);
    let skew = (point.x + point.y) * TRIANGLES_TO_SQUARES;
    let sx = point.x + skew;
    let sy = point.y + skew;
    let ix = sx.floor();
    let iy = sy.floor();

    let mut sample = part_2d(table, point, ix, iy, kernel);
    sample += part_2d(table, point, ix + 1.0, iy + 1.0, kernel);
    if sx - ix >= sy - iy {
        sample += part_2d(table, point, ix + 1.0, iy, kernel);
    } else {
        sample += part_2d(table, point, ix, iy + 1.0, kernel);
    }
    sample.derivative *= frequency;
    sample
}

fn sum_3d(table: &HashTable, point: Point3<f64>, frequency: f64, kernel: Kernel) -> NoiseSample {
    let point = Point3::new(point.x * frequency, point.y * frequency, point.z * frequency);
    let skew = (point.x + point.y + point.z) * SKEW_3D;
    let s = Vector3::new(point.x + skew, point.y + skew, point.z + skew);
    let i = Vector3::new(s.x.floor(), s.y.floor(), s.z.floor());
    let corner = |dx: f64, dy: f64, dz: f64| i + Vector3::new(dx, dy, dz);

    let mut sample = part_3d(table, point, i, kernel);
    sample += part_3d(table, point, corner(1.0, 1.0, 1.0), kernel);

    let (x, y, z) = (s.x - i.x, s.y - i.y, s.z - i.z);
    let (second, third) = if x >= y {
        if x >= z {
            let third = if y >= z {
                corner(1.0, 1.0, 0.0)
            } else {
                corner(1.0, 0.0, 1.0)
            };
            (corner(1.0, 0.0, 0.0), third)
        } else {
            (corner(0.0, 0.0, 1.0), corner(1.0, 0.0, 1.0))
        }
    } else if y >= z {
        let third = if x >= z {
            corner(1.0, 1.0, 0.0)
        } else {
            corner(0.0, 1.0, 1.0)
        };
        (corner(0.0, 1.0, 0.0), third)
    } else {
        (corner(0.0, 0.0, 1.0), corner(0.0, 1.0, 1.0))
    };
    sample += part_3d(table, point, second, kernel);
    sample += part_3d(table, point, third, kernel);

    sample.derivative *= frequency;
    sample
}

pub(super) fn simplex_value_1d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    sum_1d(table, point, frequency, Kernel::Value) * (2.0 / HASH_MASK as f64) - 1.0
}

pub(super) fn simplex_value_2d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    sum_2d(table, point, frequency, Kernel::Value) * SIMPLEX_VALUE_SCALE - 1.0
}

pub(super) fn simplex_value_3d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    sum_3d(table, point, frequency, Kernel::Value) * SIMPLEX_VALUE_SCALE - 1.0
}

pub(super) fn simplex_1d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    sum_1d(table, point, frequency, Kernel::Gradient) * SIMPLEX_SCALE_1D
}

pub(super) fn simplex_2d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    sum_2d(table, point, frequency, Kernel::Gradient) * SIMPLEX_SCALE_2D
}

pub(super) fn simplex_3d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    sum_3d(table, point, frequency, Kernel::Gradient) * SIMPLEX_SCALE_3D
}

#[cfg(test)]
mod tests {
    use std::f64::consts::SQRT_2;

    use super::*;

    #[test]
    fn gradient_tables_are_normalized() {
        for g in GRADIENTS_2D.iter().chain(GRADIENTS_3D.iter()) {
            assert!((g.magnitude() - 1.0).abs() < 1e-12, "{g:?}");
        }
    }

    #[test]
    fn one_dimensional_peak_maps_to_unit() {
        // Halfway between lattice points with opposing gradients.
        let peak = 27.0 / 64.0;
        assert!((peak * SIMPLEX_SCALE_1D - 1.0).abs() < 1e-12);
        assert!((SIMPLEX_SCALE_2D - 2916.0 * SQRT_2 / 125.0).abs() < 1e-9);
    }

    #[test]
    fn gradient_simplex_vanishes_on_lattice_in_one_dimension() {
        let table = HashTable::new(21);
        assert_eq!(simplex_1d(&table, Point3::new(4.0, 0.0, 0.0), 1.0).value, 0.0);
    }
}
