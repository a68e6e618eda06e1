use cgmath::{Point3, Vector3};

use crate::terrain_state::voxels::{BlockCode, BlockSide};

/// A merged rectangle of one slice mask.
///
/// `i` and `j` index the mask's two in-plane axes; `value` is the mask code
/// every covered cell shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskRect {
    /// First in-plane coordinate of the minimum corner.
    pub i: usize,
    /// Second in-plane coordinate of the minimum corner.
    pub j: usize,
    /// Extent along the first in-plane axis.
    pub width: usize,
    /// Extent along the second in-plane axis.
    pub height: usize,
    /// The shared mask value, never zero.
    pub value: i32,
}

/// Represents a rectangular face of merged voxels.
///
/// Corners go counter-clockwise when seen from the side the face looks at:
/// lower-left, lower-right, upper-right, upper-left. `width` is the extent
/// from `ll` to `lr` and `height` the extent from `ll` to `ul`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Lower-left corner
    pub ll: Point3<i32>,
    /// Lower-right corner
    pub lr: Point3<i32>,
    /// Upper-right corner
    pub ur: Point3<i32>,
    /// Upper-left corner
    pub ul: Point3<i32>,
    /// Voxels along `ll` to `lr`
    pub width: u32,
    /// Voxels along `ll` to `ul`
    pub height: u32,
    /// Material of the face
    pub code: BlockCode,
    /// Which way the face looks
    pub side: BlockSide,
}

impl Face {
    /// Builds the face of a merged mask rectangle.
    ///
    /// # Arguments
    /// * `axis` - The swept axis `d`; the in-plane axes are `d + 1` and `d + 2`
    /// * `slice` - The slice index `w`; the face plane sits at `w + 1`
    /// * `rect` - The merged rectangle
    /// * `code` - Material of the face
    pub fn from_rect(axis: usize, slice: i32, rect: &MaskRect, code: BlockCode) -> Self {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;

        let mut origin = Point3::new(0, 0, 0);
        origin[axis] = slice + 1;
        origin[u] = rect.i as i32;
        origin[v] = rect.j as i32;

        let mut du = Vector3::new(0, 0, 0);
        du[u] = rect.width as i32;
        let mut dv = Vector3::new(0, 0, 0);
        dv[v] = rect.height as i32;

        let positive = rect.value > 0;
        let side = BlockSide::from_axis(axis, positive);
        let (width, height) = (rect.width as u32, rect.height as u32);

        // u x v points along +axis, so the (u, v) order is counter-clockwise
        // for positive faces and has to be mirrored for negative ones.
        if positive {
            Face {
                ll: origin,
                lr: origin + du,
                ur: origin + du + dv,
                ul: origin + dv,
                width,
                height,
                code,
                side,
            }
        } else {
            Face {
                ll: origin,
                lr: origin + dv,
                ur: origin + du + dv,
                ul: origin + du,
                width: height,
                height: width,
                code,
                side,
            }
        }
    }

    /// The corners in winding order.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        [self.ll, self.lr, self.ur, self.ul]
    }

    /// Number of voxel faces this face covers.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    fn normal_of(face: &Face) -> Vector3<i32> {
        let a = (face.lr - face.ll).cast::<f64>().unwrap_or(Vector3::new(0.0, 0.0, 0.0));
        let b = (face.ul - face.ll).cast::<f64>().unwrap_or(Vector3::new(0.0, 0.0, 0.0));
        let n = a.cross(b).normalize();
        Vector3::new(n.x.round() as i32, n.y.round() as i32, n.z.round() as i32)
    }

    #[test]
    fn winding_matches_the_side() {
        for axis in 0..3 {
            for value in [4, -4] {
                let rect = MaskRect {
                    i: 1,
                    j: 2,
                    width: 3,
                    height: 2,
                    value,
                };
                let face = Face::from_rect(axis, 0, &rect, 3);
                assert_eq!(face.side.axis(), axis);
                assert_eq!(face.side.is_positive(), value > 0);
                assert_eq!(normal_of(&face), face.side.normal());
                assert_eq!(face.area(), 6);
                assert_eq!(face.ll[axis], 1);
            }
        }
    }

    #[test]
    fn extents_follow_the_corners() {
        let rect = MaskRect {
            i: 0,
            j: 0,
            width: 3,
            height: 2,
            value: -1,
        };
        let face = Face::from_rect(1, 4, &rect, 0);
        assert_eq!(face.side, BlockSide::BOTTOM);
        let along = face.lr - face.ll;
        let up = face.ul - face.ll;
        assert_eq!(along.x.abs() + along.y.abs() + along.z.abs(), face.width as i32);
        assert_eq!(up.x.abs() + up.y.abs() + up.z.abs(), face.height as i32);
    }
}
