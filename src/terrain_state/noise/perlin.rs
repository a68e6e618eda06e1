//! Perlin noise: hashed lattice gradients dotted with the offset to each
//! corner, blended on the quintic curve.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

use cgmath::{InnerSpace, Point3, Vector3};

use super::{
    interpolation::{smooth, smooth_derivative},
    lattice, HashTable, NoiseSample,
};

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

// Cube edge midpoints, with four repeated to fill sixteen slots.
const GRADIENTS_3D: [Vector3<f64>; 16] = [
    Vector3::new(1.0, 1.0, 0.0),
    Vector3::new(-1.0, 1.0, 0.0),
    Vector3::new(1.0, -1.0, 0.0),
    Vector3::new(-1.0, -1.0, 0.0),
    Vector3::new(1.0, 0.0, 1.0),
    Vector3::new(-1.0, 0.0, 1.0),
    Vector3::new(1.0, 0.0, -1.0),
    Vector3::new(-1.0, 0.0, -1.0),
    Vector3::new(0.0, 1.0, 1.0),
    Vector3::new(0.0, -1.0, 1.0),
    Vector3::new(0.0, 1.0, -1.0),
    Vector3::new(0.0, -1.0, -1.0),
    Vector3::new(1.0, 1.0, 0.0),
    Vector3::new(-1.0, 1.0, 0.0),
    Vector3::new(0.0, -1.0, 1.0),
    Vector3::new(0.0, -1.0, -1.0),
];
const GRADIENTS_3D_MASK: i32 = 15;

pub(super) fn perlin_1d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    let (i0, t0) = lattice(point.x * frequency);
    let t1 = t0 - 1.0;
    let i1 = i0 + 1;

    let g0 = GRADIENTS_1D[(table.get(i0) & GRADIENTS_1D_MASK) as usize];
    let g1 = GRADIENTS_1D[(table.get(i1) & GRADIENTS_1D_MASK) as usize];

    let v0 = g0 * t0;
    let v1 = g1 * t1;

    let dt = smooth_derivative(t0);
    let t = smooth(t0);

    let a = v0;
    let b = v1 - v0;
    let da = g0;
    let db = g1 - g0;

    let derivative = (da + db * t + b * dt) * frequency;
    NoiseSample::new(a + b * t, Vector3::new(derivative, 0.0, 0.0)) * 2.0
}

pub(super) fn perlin_2d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    let (ix0, tx0) = lattice(point.x * frequency);
    let (iy0, ty0) = lattice(point.y * frequency);
    let (tx1, ty1) = (tx0 - 1.0, ty0 - 1.0);
    let (ix1, iy1) = (ix0 + 1, iy0 + 1);

    let h0 = table.get(ix0);
    let h1 = table.get(ix1);
    let gradient = |hash: i32| GRADIENTS_2D[(table.get(hash) & GRADIENTS_2D_MASK) as usize];
    let g00 = gradient(h0 + iy0);
    let g10 = gradient(h1 + iy0);
    let g01 = gradient(h0 + iy1);
    let g11 = gradient(h1 + iy1);

    let v00 = g00.dot(Vector3::new(tx0, ty0, 0.0));
    let v10 = g10.dot(Vector3::new(tx1, ty0, 0.0));
    let v01 = g01.dot(Vector3::new(tx0, ty1, 0.0));
    let v11 = g11.dot(Vector3::new(tx1, ty1, 0.0));

    let dtx = smooth_derivative(tx0);
    let dty = smooth_derivative(ty0);
    let tx = smooth(tx0);
    let ty = smooth(ty0);

    let a = v00;
    let b = v10 - v00;
    let c = v01 - v00;
    let d = v11 - v01 - v10 + v00;

    let da = g00;
    let db = g10 - g00;
    let dc = g01 - g00;
    let dd = g11 - g01 - g10 + g00;

    let mut derivative = da + db * tx + (dc + dd * tx) * ty;
    derivative.x += (b + d * ty) * dtx;
    derivative.y += (c + d * tx) * dty;
    derivative.z = 0.0;

    NoiseSample::new(a + b * tx + (c + d * tx) * ty, derivative * frequency) * SQRT_2
}

pub(super) fn perlin_3d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    let (ix0, tx0) = lattice(point.x * frequency);
    let (iy0, ty0) = lattice(point.y * frequency);
    let (iz0, tz0) = lattice(point.z * frequency);
    let (tx1, ty1, tz1) = (tx0 - 1.0, ty0 - 1.0, tz0 - 1.0);
    let (ix1, iy1, iz1) = (ix0 + 1, iy0 + 1, iz0 + 1);

    let h0 = table.get(ix0);
    let h1 = table.get(ix1);
    let h00 = table.get(h0 + iy0);
    let h10 = table.get(h1 + iy0);
    let h01 = table.get(h0 + iy1);
    let h11 = table.get(h1 + iy1);

    let gradient = |hash: i32| GRADIENTS_3D[(table.get(hash) & GRADIENTS_3D_MASK) as usize];
    let g000 = gradient(h00 + iz0);
    let g100 = gradient(h10 + iz0);
    let g010 = gradient(h01 + iz0);
    let g110 = gradient(h11 + iz0);
    let g001 = gradient(h00 + iz1);
    let g101 = gradient(h10 + iz1);
    let g011 = gradient(h01 + iz1);
    let g111 = gradient(h11 + iz1);

    let v000 = g000.dot(Vector3::new(tx0, ty0, tz0));
    let v100 = g100.dot(Vector3::new(tx1, ty0, tz0));
    let v010 = g010.dot(Vector3::new(tx0, ty1, tz0));
    let v110 = g110.dot(Vector3::new(tx1, ty1, tz0));
    let v001 = g001.dot(Vector3::new(tx0, ty0, tz1));
    let v101 = g101.dot(Vector3::new(tx1, ty0, tz1));
    let v011 = g011.dot(Vector3::new(tx0, ty1, tz1));
    let v111 = g111.dot(Vector3::new(tx1, ty1, tz1));

    let dtx = smooth_derivative(tx0);
    let dty = smooth_derivative(ty0);
    let dtz = smooth_derivative(tz0);
    let tx = smooth(tx0);
    let ty = smooth(ty0);
    let tz = smooth(tz0);

    let a = v000;
    let b = v100 - v000;
    let c = v010 - v000;
    let d = v001 - v000;
    let e = v110 - v010 - v100 + v000;
    let f = v101 - v001 - v100 + v000;
    let g = v011 - v001 - v010 + v000;
    let h = v111 - v011 - v101 + v001 - v110 + v010 + v100 - v000;

    let da = g000;
    let db = g100 - g000;
    let dc = g010 - g000;
    let dd = g001 - g000;
    let de = g110 - g010 - g100 + g000;
    let df = g101 - g001 - g100 + g000;
    let dg = g011 - g001 - g010 + g000;
    let dh = g111 - g011 - g101 + g001 - g110 + g010 + g100 - g000;

    let value = a + b * tx + (c + e * tx) * ty + (d + f * tx + (g + h * tx) * ty) * tz;

    let mut derivative =
        da + db * tx + (dc + de * tx) * ty + (dd + df * tx + (dg + dh * tx) * ty) * tz;
    derivative.x += (b + e * ty + (f + h * ty) * tz) * dtx;
    derivative.y += (c + e * tx + (g + h * tx) * tz) * dty;
    derivative.z += (d + f * tx + (g + h * tx) * ty) * dtz;

    NoiseSample::new(value, derivative * frequency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_on_every_lattice_point() {
        let table = HashTable::new(17);
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (3.0, -2.0, 9.0), (-128.0, 40.0, 1.0)] {
            let point = Point3::new(x, y, z);
            assert_eq!(perlin_1d(&table, point, 1.0).value, 0.0);
            assert_eq!(perlin_2d(&table, point, 1.0).value, 0.0);
            assert_eq!(perlin_3d(&table, point, 1.0).value, 0.0);
        }
    }

    #[test]
    fn two_dimensional_gradients_are_unit_length() {
        for g in GRADIENTS_2D {
            assert!((g.magnitude() - 1.0).abs() < 1e-12);
        }
    }
}
