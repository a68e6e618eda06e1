//! Value noise: hashed lattice values blended on the quintic curve.

use cgmath::{Point3, Vector3};

use super::{
    interpolation::{smooth, smooth_derivative},
    lattice, HashTable, NoiseSample, HASH_MASK,
};

/// Remaps a raw hash blend from [0, 255] onto [-1, 1].
#[inline]
fn normalize(sample: NoiseSample) -> NoiseSample {
    sample * (2.0 / HASH_MASK as f64) - 1.0
}

pub(super) fn value_1d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    let (i0, t) = lattice(point.x * frequency);
    let i1 = i0 + 1;

    let h0 = table.get(i0) as f64;
    let h1 = table.get(i1) as f64;

    let dt = smooth_derivative(t);
    let t = smooth(t);

    let a = h0;
    let b = h1 - h0;

    normalize(NoiseSample::new(
        a + b * t,
        Vector3::new(b * dt * frequency, 0.0, 0.0),
    ))
}

pub(super) fn value_2d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    let (ix0, tx) = lattice(point.x * frequency);
    let (iy0, ty) = lattice(point.y * frequency);
    let (ix1, iy1) = (ix0 + 1, iy0 + 1);

    let h0 = table.get(ix0);
    let h1 = table.get(ix1);
    let h00 = table.get(h0 + iy0) as f64;
    let h10 = table.get(h1 + iy0) as f64;
    let h01 = table.get(h0 + iy1) as f64;
    let h11 = table.get(h1 + iy1) as f64;

    let dtx = smooth_derivative(tx);
    let dty = smooth_derivative(ty);
    let tx = smooth(tx);
    let ty = smooth(ty);

    let a = h00;
    let b = h10 - h00;
    let c = h01 - h00;
    let d = h11 - h01 - h10 + h00;

    let derivative = Vector3::new((b + d * ty) * dtx, (c + d * tx) * dty, 0.0) * frequency;
    normalize(NoiseSample::new(a + b * tx + (c + d * tx) * ty, derivative))
}

pub(super) fn value_3d(table: &HashTable, point: Point3<f64>, frequency: f64) -> NoiseSample {
    let (ix0, tx) = lattice(point.x * frequency);
    let (iy0, ty) = lattice(point.y * frequency);
    let (iz0, tz) = lattice(point.z * frequency);
    let (ix1, iy1, iz1) = (ix0 + 1, iy0 + 1, iz0 + 1);

    let h0 = table.get(ix0);
    let h1 = table.get(ix1);
    let h00 = table.get(h0 + iy0);
    let h10 = table.get(h1 + iy0);
    let h01 = table.get(h0 + iy1);
    let h11 = table.get(h1 + iy1);
    let h000 = table.get(h00 + iz0) as f64;
    let h100 = table.get(h10 + iz0) as f64;
    let h010 = table.get(h01 + iz0) as f64;
    let h110 = table.get(h11 + iz0) as f64;
    let h001 = table.get(h00 + iz1) as f64;
    let h101 = table.get(h10 + iz1) as f64;
    let h011 = table.get(h01 + iz1) as f64;
    let h111 = table.get(h11 + iz1) as f64;

    let dtx = smooth_derivative(tx);
    let dty = smooth_derivative(ty);
    let dtz = smooth_derivative(tz);
    let tx = smooth(tx);
    let ty = smooth(ty);
    let tz = smooth(tz);

    let a = h000;
    let b = h100 - h000;
    let c = h010 - h000;
    let d = h001 - h000;
    let e = h110 - h010 - h100 + h000;
    let f = h101 - h001 - h100 + h000;
    let g = h011 - h001 - h010 + h000;
    let h = h111 - h011 - h101 + h001 - h110 + h010 + h100 - h000;

    let value = a + b * tx + (c + e * tx) * ty + (d + f * tx + (g + h * tx) * ty) * tz;
    let derivative = Vector3::new(
        (b + e * ty + (f + h * ty) * tz) * dtx,
        (c + e * tx + (g + h * tx) * tz) * dty,
        (d + f * tx + (g + h * tx) * ty) * dtz,
    ) * frequency;

    normalize(NoiseSample::new(value, derivative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_points_return_hashed_values() {
        let table = HashTable::new(3);
        let origin = Point3::new(0.0, 0.0, 0.0);
        let expected = table.get(0) as f64 * 2.0 / 255.0 - 1.0;
        assert!((value_1d(&table, origin, 1.0).value - expected).abs() < 1e-12);

        let expected_2d = table.get(table.get(0)) as f64 * 2.0 / 255.0 - 1.0;
        assert!((value_2d(&table, origin, 1.0).value - expected_2d).abs() < 1e-12);
    }

    #[test]
    fn gradient_vanishes_on_lattice() {
        let table = HashTable::new(3);
        let sample = value_3d(&table, Point3::new(2.0, 5.0, -1.0), 1.0);
        assert_eq!(sample.derivative, Vector3::new(0.0, 0.0, 0.0));
    }
}
